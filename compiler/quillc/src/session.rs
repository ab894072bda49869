//! The message-passing compile session.
//!
//! Compilation runs on its own thread; the only way in is the request, the
//! only way out is the event channel. Events serialize as JSON lines for
//! non-Rust hosts (`{"type":"progress","total":…,"current":…,…}`).

use crossbeam::channel::{unbounded, Receiver, Sender};
use quill_compile::{CompileHooks, Compiler, CompilerConfig, OutputFile, Progress};
use serde::Serialize;

/// A request to compile one source text.
#[derive(Clone, Debug)]
pub struct CompileRequest {
    pub namespace: String,
    pub source_text: String,
    /// Source-file identifier: keys slot allocation, hook aggregation,
    /// and progress tokens.
    pub file: String,
    pub config: CompilerConfig,
}

/// One message out of a compile session.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompileEvent {
    /// Rate-limited progress over the statement-consumption loop.
    Progress {
        total: usize,
        current: usize,
        percent: f32,
        token: String,
    },
    /// Non-terminal log output.
    Log { message: String },
    /// Terminal: compilation succeeded with these files.
    Finished { files: Vec<OutputFile> },
    /// Terminal: compilation failed.
    Failed { message: String },
}

impl CompileEvent {
    /// Whether this event ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CompileEvent::Finished { .. } | CompileEvent::Failed { .. })
    }
}

/// Forwards compiler hooks onto the event channel.
struct ChannelHooks {
    tx: Sender<CompileEvent>,
}

impl CompileHooks for ChannelHooks {
    fn on_log(&mut self, message: &str) {
        let _ = self.tx.send(CompileEvent::Log {
            message: message.to_string(),
        });
    }

    fn on_progress(&mut self, progress: &Progress) {
        let _ = self.tx.send(CompileEvent::Progress {
            total: progress.total,
            current: progress.current,
            percent: progress.percent,
            token: progress.token.clone(),
        });
    }
}

/// A compile running on its own thread.
pub struct CompileSession;

impl CompileSession {
    /// Spawn a compilation. The receiver yields events until a terminal
    /// one; the thread exits after sending it.
    pub fn spawn(request: CompileRequest) -> Receiver<CompileEvent> {
        let (tx, rx) = unbounded();
        std::thread::spawn(move || {
            let mut compiler = Compiler::new(request.config.clone());
            Self::serve(&mut compiler, &request, &tx);
        });
        rx
    }

    /// Run one request against an existing compiler, sending events on
    /// `tx`. Split out so a host holding a multi-file run can reuse the
    /// compiler across requests.
    pub fn serve(compiler: &mut Compiler, request: &CompileRequest, tx: &Sender<CompileEvent>) {
        let mut hooks = ChannelHooks { tx: tx.clone() };
        let result = compiler.compile_with_hooks(
            &request.namespace,
            &request.source_text,
            &request.file,
            &mut hooks,
        );
        let terminal = match result {
            Ok(files) => CompileEvent::Finished { files },
            Err(err) => CompileEvent::Failed {
                message: err.to_string(),
            },
        };
        let _ = tx.send(terminal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(source: &str) -> CompileRequest {
        CompileRequest {
            namespace: "test".to_string(),
            source_text: source.to_string(),
            file: "test.quill".to_string(),
            config: CompilerConfig::default(),
        }
    }

    fn drain(rx: &Receiver<CompileEvent>) -> Vec<CompileEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.recv() {
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                break;
            }
        }
        events
    }

    #[test]
    fn session_ends_with_finished() {
        let rx = CompileSession::spawn(request("function f {\n  say hi\n}\n"));
        let events = drain(&rx);
        let Some(CompileEvent::Finished { files }) = events.last() else {
            panic!("expected Finished, got {:?}", events.last());
        };
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "data/test/functions/f.mcfunction");
    }

    #[test]
    fn session_reports_failure_as_terminal_event() {
        let rx = CompileSession::spawn(request("function f {\n  error \"boom\"\n}\n"));
        let events = drain(&rx);
        let Some(CompileEvent::Failed { message }) = events.last() else {
            panic!("expected Failed, got {:?}", events.last());
        };
        assert_eq!(message, "error: boom (line 2)");
    }

    #[test]
    fn progress_events_serialize_with_type_tag() {
        let event = CompileEvent::Progress {
            total: 10,
            current: 5,
            percent: 50.0,
            token: "t.quill".to_string(),
        };
        let Ok(json) = serde_json::to_string(&event) else {
            panic!("serializes");
        };
        assert!(json.starts_with(r#"{"type":"progress""#));
        assert!(json.contains(r#""total":10"#));
        assert!(json.contains(r#""token":"t.quill""#));
    }
}
