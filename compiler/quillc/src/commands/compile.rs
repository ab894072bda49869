//! `quill compile` — compile one source file and write the output tree.

use crate::session::{CompileEvent, CompileRequest, CompileSession};
use quill_compile::CompilerConfig;
use std::path::{Path, PathBuf};

/// Options of the `compile` command.
#[derive(Default, Debug)]
pub struct CompileOptions {
    /// Namespace for the generated functions; defaults to the file stem.
    pub namespace: Option<String>,
    /// Directory the output tree is written under; no files are written
    /// when absent.
    pub out: Option<PathBuf>,
    /// Header prepended to every generated function file.
    pub header: Option<String>,
    /// Stream events as JSON lines to stdout instead of human output.
    pub json: bool,
}

/// Compile `path`, returning a process exit code.
pub fn compile_file(path: &str, options: &CompileOptions) -> i32 {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read `{path}`: {err}");
            return 1;
        }
    };
    let namespace = match &options.namespace {
        Some(ns) => ns.clone(),
        None => namespace_from_path(path),
    };
    let request = CompileRequest {
        namespace,
        source_text: source,
        file: path.to_string(),
        config: CompilerConfig {
            header: options.header.clone(),
            ..CompilerConfig::default()
        },
    };

    let rx = CompileSession::spawn(request);
    while let Ok(event) = rx.recv() {
        if options.json {
            if let Ok(line) = serde_json::to_string(&event) {
                println!("{line}");
            }
        }
        match event {
            CompileEvent::Progress { .. } => {}
            CompileEvent::Log { message } => {
                if !options.json {
                    eprintln!("{message}");
                }
            }
            CompileEvent::Finished { files } => {
                if let Some(out) = &options.out {
                    if let Err(err) = write_files(out, &files) {
                        eprintln!("error: {err}");
                        return 1;
                    }
                }
                if !options.json {
                    println!("{} file(s) generated", files.len());
                    for file in &files {
                        println!("  {}", file.path);
                    }
                }
                return 0;
            }
            CompileEvent::Failed { message } => {
                if !options.json {
                    eprintln!("{message}");
                }
                return 1;
            }
        }
    }
    // Channel closed without a terminal event: the session thread died.
    eprintln!("error: compile session ended unexpectedly");
    1
}

/// Derive a namespace from the source path: the lowercased file stem with
/// anything outside the identifier charset replaced by `_`.
fn namespace_from_path(path: &str) -> String {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("pack");
    let mut out = String::with_capacity(stem.len());
    for c in stem.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        out.push_str("pack");
    }
    out
}

fn write_files(
    out: &Path,
    files: &[quill_compile::OutputFile],
) -> std::io::Result<()> {
    for file in files {
        let target = out.join(&file.path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(target, &file.contents)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn namespace_is_sanitized_from_the_stem() {
        assert_eq!(namespace_from_path("rigs/My Horse.quill"), "my_horse");
        assert_eq!(namespace_from_path("walk_cycle.quill"), "walk_cycle");
    }
}
