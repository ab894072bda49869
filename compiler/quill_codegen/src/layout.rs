//! Output tree layout and hook registries.
//!
//! Generated functions land datapack-style under
//! `data/<namespace>/functions/<path>.mcfunction`; the load/tick hook
//! registries are JSON tag files listing every registered reference.

use quill_ir::FunctionRef;

/// File path for a generated function.
pub fn function_file_path(fref: &FunctionRef) -> String {
    format!(
        "data/{}/functions/{}.mcfunction",
        fref.namespace, fref.path
    )
}

/// The two project-wide hook registries.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TagKind {
    Load,
    Tick,
}

impl TagKind {
    pub fn name(self) -> &'static str {
        match self {
            TagKind::Load => "load",
            TagKind::Tick => "tick",
        }
    }
}

/// File path for a hook registry tag.
pub fn tag_file_path(kind: TagKind) -> String {
    format!("data/minecraft/tags/functions/{}.json", kind.name())
}

/// Render a tag registry document.
pub fn render_tag_json(values: &[String]) -> String {
    let doc = serde_json::json!({ "values": values });
    let mut text = serde_json::to_string_pretty(&doc).unwrap_or_else(|_| String::from("{}"));
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn function_paths_are_datapack_shaped() {
        let Ok(fref) = FunctionRef::new("rig", ["anim", "walk"]) else {
            panic!("ref");
        };
        assert_eq!(
            function_file_path(&fref),
            "data/rig/functions/anim/walk.mcfunction"
        );
    }

    #[test]
    fn tag_paths() {
        assert_eq!(
            tag_file_path(TagKind::Load),
            "data/minecraft/tags/functions/load.json"
        );
        assert_eq!(
            tag_file_path(TagKind::Tick),
            "data/minecraft/tags/functions/tick.json"
        );
    }

    #[test]
    fn tag_json_lists_values_in_order() {
        let json = render_tag_json(&["a:x".to_string(), "b:y".to_string()]);
        let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&json) else {
            panic!("tag json parses");
        };
        assert_eq!(parsed["values"][0], "a:x");
        assert_eq!(parsed["values"][1], "b:y");
    }
}
