//! Quill compiler CLI.

use quillc::commands::{compile_file, CompileOptions};
use std::path::PathBuf;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "compile" => {
            if args.len() < 3 {
                eprintln!("Usage: quill compile <file.quill> [options]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --namespace <ns>   Namespace for generated functions");
                eprintln!("  --out <dir>        Write the output tree under <dir>");
                eprintln!("  --header <text>    Header line for every generated file");
                eprintln!("  --json             Stream events as JSON lines");
                std::process::exit(1);
            }
            let mut options = CompileOptions::default();
            let mut i = 3;
            while i < args.len() {
                match args[i].as_str() {
                    "--namespace" if i + 1 < args.len() => {
                        options.namespace = Some(args[i + 1].clone());
                        i += 2;
                    }
                    "--out" if i + 1 < args.len() => {
                        options.out = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    }
                    "--header" if i + 1 < args.len() => {
                        options.header = Some(args[i + 1].clone());
                        i += 2;
                    }
                    "--json" => {
                        options.json = true;
                        i += 1;
                    }
                    other => {
                        eprintln!("error: unknown option `{other}`");
                        std::process::exit(1);
                    }
                }
            }
            std::process::exit(compile_file(&args[2], &options));
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("error: unknown command `{other}`");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("QUILL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_usage() {
    println!("Quill compiler");
    println!();
    println!("Usage: quill <command> [arguments]");
    println!();
    println!("Commands:");
    println!("  compile <file.quill>   Compile a source file");
    println!("  help                   Show this help");
}
