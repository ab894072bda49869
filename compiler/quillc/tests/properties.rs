// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end properties of the compiler, driven through the public
//! `quill_compile` API and the session protocol.

use pretty_assertions::assert_eq;
use quill_compile::{Compiler, CompilerConfig, OutputFile};
use quillc::{CompileEvent, CompileRequest, CompileSession};

fn compiler() -> Compiler {
    Compiler::new(CompilerConfig::default())
}

fn compile(c: &mut Compiler, namespace: &str, source: &str, file: &str) -> Vec<OutputFile> {
    c.compile(namespace, source, file)
        .expect("compilation should succeed")
}

#[test]
fn well_formed_input_produces_one_addressed_file() {
    let mut c = Compiler::new(CompilerConfig {
        header: Some("# header".to_string()),
        ..CompilerConfig::default()
    });
    let files = compile(&mut c, "a", "function b {\n}\n", "a.quill");
    assert_eq!(files.len(), 1);
    // The file's reference is `a:b`; its contents are the header alone.
    assert_eq!(files[0].path, "data/a/functions/b.mcfunction");
    assert_eq!(files[0].contents, "# header\n");
}

#[test]
fn dir_scopes_nest_into_the_path() {
    let mut c = compiler();
    let files = compile(&mut c, "a", "dir x {\n  function b {\n  }\n}\n", "a.quill");
    assert_eq!(files[0].path, "data/a/functions/x/b.mcfunction");
}

#[test]
fn unrolled_loop_emits_count_copies_and_keeps_last_binding() {
    let mut c = compiler();
    let files = compile(
        &mut c,
        "a",
        "function f {\n  LOOP(3, i) {\n    say copy <% i %>\n  }\n}\n",
    "a.quill",
    );
    assert_eq!(
        files[0].contents,
        "say copy 0\nsay copy 1\nsay copy 2\n"
    );
    assert_eq!(c.state().env.get("i"), Some(&quill_eval::Value::Int(2)));
}

#[test]
fn untaken_compile_time_branch_contributes_nothing() {
    let mut c = compiler();
    let files = compile(
        &mut c,
        "a",
        "function f {\n  !IF(false) {\n    utter nonsense ++ {\n      more {\n      }\n    }\n  }\n}\n",
        "a.quill",
    );
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].contents, "");
}

#[test]
fn taken_compile_time_branch_is_equivalent_to_its_body() {
    let mut taken = compiler();
    let with_if = compile(
        &mut taken,
        "a",
        "function f {\n  !IF(true) {\n    say x\n  }\n}\n",
        "a.quill",
    );
    let mut plain = compiler();
    let without = compile(&mut plain, "a", "function f {\n  say x\n}\n", "a.quill");
    assert_eq!(with_if, without);
}

#[test]
fn distinct_until_macros_never_share_a_slot() {
    let mut c = compiler();
    let files = compile(
        &mut c,
        "a",
        "function f {\n  until(if score x y matches 1, 1s) {\n  }\n}\nfunction g {\n  until(if score x y matches 2, 1s) {\n  }\n}\n",
        "a.quill",
    );
    let all: String = files.iter().map(|f| f.contents.as_str()).collect();
    assert!(all.contains("#quill_until_0"));
    assert!(all.contains("#quill_until_1"));
    // Releasing the file's slots lets a later file reuse the integers.
    let files = compile(
        &mut c,
        "b",
        "function h {\n  until(if score x y matches 1, 1s) {\n  }\n}\n",
        "a.quill",
    );
    let h = files
        .iter()
        .find(|f| f.path == "data/b/functions/h.mcfunction")
        .expect("h exists");
    assert!(h.contents.contains("#quill_until_0"));
}

#[test]
fn finalizing_the_same_path_twice_emits_once() {
    let mut c = compiler();
    let files = compile(
        &mut c,
        "a",
        "function f {\n  say first\n}\nfunction f {\n  say second\n}\n",
        "a.quill",
    );
    let f_files: Vec<_> = files
        .iter()
        .filter(|f| f.path == "data/a/functions/f.mcfunction")
        .collect();
    assert_eq!(f_files.len(), 1);
    assert_eq!(f_files[0].contents, "say first\n");
}

#[test]
fn dispatch_tree_over_twenty_items_has_depth_two() {
    let tree = quill_codegen::build_tree(0..20).expect("non-empty");
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.range(), (0, 20));
}

#[test]
fn sequence_schedules_non_zero_buckets_with_replace() {
    let mut c = compiler();
    let files = compile(
        &mut c,
        "a",
        "function f {\n  sequence {\n    delay 1s\n    say a\n    setdelay 40t\n    say b\n  }\n}\n",
        "a.quill",
    );
    let f = files
        .iter()
        .find(|f| f.path == "data/a/functions/f.mcfunction")
        .expect("f exists");
    // `say a` lands in the tick-20 bucket, `say b` in tick-40; neither is
    // inlined in the enclosing function.
    assert!(!f.contents.contains("say a"));
    assert!(!f.contents.contains("say b"));
    assert_eq!(
        f.contents
            .lines()
            .filter(|l| l.starts_with("schedule function ") && l.ends_with("replace"))
            .count(),
        2
    );
    assert!(f.contents.contains(" 20t replace"));
    assert!(f.contents.contains(" 40t replace"));
}

#[test]
fn invalid_identifier_fails_naming_the_offender() {
    let mut c = compiler();
    let err = c.compile("a", "dir My-Dir {\n}\n", "a.quill");
    let message = err.expect_err("must fail").to_string();
    assert!(message.contains("My-Dir"));
    assert!(message.contains("line 1"));
    assert_eq!(c.outputs(), Vec::new());
}

#[test]
fn session_streams_terminal_event_with_files() {
    let rx = CompileSession::spawn(CompileRequest {
        namespace: "a".to_string(),
        source_text: "function b {\n  say hi\n}\n".to_string(),
        file: "a.quill".to_string(),
        config: CompilerConfig::default(),
    });
    let mut terminal = None;
    while let Ok(event) = rx.recv() {
        if event.is_terminal() {
            terminal = Some(event);
            break;
        }
    }
    let Some(CompileEvent::Finished { files }) = terminal else {
        panic!("expected Finished");
    };
    assert_eq!(files[0].path, "data/a/functions/b.mcfunction");
    assert_eq!(files[0].contents, "say hi\n");
}
