//! Compiler configuration.

use serde::{Deserialize, Serialize};

/// Recognized configuration options, merged over defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerConfig {
    /// Reserved for verbose diagnostics.
    pub dev: bool,
    /// Prepended as the first lines of every generated function file.
    pub header: Option<String>,
    /// Scoreboard objective backing the internal flags of the
    /// control-flow and scheduling macros.
    pub internal_scoreboard: String,
    /// Path segment under which anonymous and auxiliary functions nest.
    pub generated_directory: String,
    /// Unshifted onto the namespace stack ahead of the caller-supplied
    /// namespace.
    pub root_namespace: Option<String>,
    /// Unshifted after `root_namespace`, before the caller-supplied
    /// namespace.
    pub default_namespace: Option<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            dev: false,
            header: None,
            internal_scoreboard: "quill.internal".to_string(),
            generated_directory: "zzz/generated".to_string(),
            root_namespace: None,
            default_namespace: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.internal_scoreboard, "quill.internal");
        assert_eq!(config.generated_directory, "zzz/generated");
        assert_eq!(config.header, None);
    }

    #[test]
    fn partial_json_merges_over_defaults() {
        let parsed: Result<CompilerConfig, _> =
            serde_json::from_str(r##"{"header": "# built by quill"}"##);
        let Ok(config) = parsed else {
            panic!("config parses");
        };
        assert_eq!(config.header.as_deref(), Some("# built by quill"));
        assert_eq!(config.internal_scoreboard, "quill.internal");
    }
}
