//! Balanced dispatch-tree generation.
//!
//! The target runtime can only branch by invoking another function behind a
//! range guard. Dispatching over N frames as a flat list costs N guard
//! checks on every invocation; this module builds a tree of fanout at most
//! [`FANOUT`] whose depth is `ceil(log_8 N)`, bounding the checks on any
//! path to the depth.
//!
//! Invariants: every internal node covers a contiguous index range
//! `[min, max)` equal to the union of its children's ranges, with no gaps
//! and no overlaps; every leaf covers exactly one index.

use quill_ir::FunctionRef;

/// Maximum children per internal node.
pub const FANOUT: usize = 8;

/// Node of a dispatch tree over `[0, N)`.
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchNode<T> {
    Branch {
        /// Inclusive lower index bound.
        min: usize,
        /// Exclusive upper index bound.
        max: usize,
        children: Vec<DispatchNode<T>>,
    },
    Leaf {
        index: usize,
        item: T,
    },
}

impl<T> DispatchNode<T> {
    /// The `[min, max)` range this node covers.
    pub fn range(&self) -> (usize, usize) {
        match self {
            DispatchNode::Branch { min, max, .. } => (*min, *max),
            DispatchNode::Leaf { index, .. } => (*index, *index + 1),
        }
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            DispatchNode::Leaf { .. } => 0,
            DispatchNode::Branch { children, .. } => {
                1 + children.iter().map(DispatchNode::depth).max().unwrap_or(0)
            }
        }
    }
}

/// Build a balanced dispatch tree over an ordered item sequence.
///
/// Returns `None` for an empty input. Depth is `ceil(log_8 N)`: each level
/// splits its range into chunks of `8^(level_below)` so sibling subtrees
/// stay uniform and the last chunk absorbs the remainder.
pub fn build_tree<T>(items: impl IntoIterator<Item = T>) -> Option<DispatchNode<T>> {
    let indexed: Vec<(usize, T)> = items.into_iter().enumerate().collect();
    if indexed.is_empty() {
        return None;
    }
    Some(build(indexed))
}

fn build<T>(mut items: Vec<(usize, T)>) -> DispatchNode<T> {
    if items.len() == 1 {
        let (index, item) = items.remove(0);
        return DispatchNode::Leaf { index, item };
    }

    // Chunk size is the largest power of the fanout strictly below the
    // node's span, so at most FANOUT children come out.
    let len = items.len();
    let mut chunk = 1;
    while chunk * FANOUT < len {
        chunk *= FANOUT;
    }

    let min = items[0].0;
    let max = min + len;
    let mut children = Vec::with_capacity(len.div_ceil(chunk));
    while !items.is_empty() {
        let take = chunk.min(items.len());
        let rest = items.split_off(take);
        children.push(build(std::mem::replace(&mut items, rest)));
    }
    DispatchNode::Branch { min, max, children }
}

/// One generated function of an emitted tree.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeFunction {
    /// Path of this function relative to the dispatch root. Empty for the
    /// root itself.
    pub path: String,
    pub commands: Vec<String>,
}

/// How guards and invocations are rendered.
pub struct EmitContext {
    /// Reference of the dispatch root function; children nest under its
    /// path.
    pub root: FunctionRef,
    /// Score holder carrying the index being dispatched on.
    pub holder: String,
    /// Scoreboard objective of the index.
    pub objective: String,
}

/// Render a dispatch tree as generated functions.
///
/// Each branch becomes a function with one range-guarded invocation per
/// child; each leaf becomes a function holding the caller-supplied command
/// for its item, reached behind an exact-index guard.
pub fn emit_tree<T>(
    root: &DispatchNode<T>,
    ctx: &EmitContext,
    leaf_command: impl Fn(usize, &T) -> String,
) -> Vec<TreeFunction> {
    let mut out = Vec::new();
    emit_node(root, ctx, &leaf_command, String::new(), &mut out);
    out
}

fn emit_node<T>(
    node: &DispatchNode<T>,
    ctx: &EmitContext,
    leaf_command: &impl Fn(usize, &T) -> String,
    path: String,
    out: &mut Vec<TreeFunction>,
) {
    match node {
        DispatchNode::Leaf { index, item } => {
            out.push(TreeFunction {
                path,
                commands: vec![leaf_command(*index, item)],
            });
        }
        DispatchNode::Branch { children, .. } => {
            let mut commands = Vec::with_capacity(children.len());
            for (pos, child) in children.iter().enumerate() {
                // Leaf children are named by their global index, branch
                // children by their position; a leaf under a branching
                // level always has index >= FANOUT, so the names never
                // collide.
                let segment = match child {
                    DispatchNode::Leaf { index, .. } => index.to_string(),
                    DispatchNode::Branch { .. } => pos.to_string(),
                };
                let child_path = if path.is_empty() {
                    segment
                } else {
                    format!("{path}/{segment}")
                };
                let target = format!("{}/{}", ctx.root, child_path);
                let (min, max) = child.range();
                let guard = if max - min == 1 {
                    format!("matches {min}")
                } else {
                    format!("matches {min}..{}", max - 1)
                };
                commands.push(format!(
                    "execute if score {} {} {guard} run function {target}",
                    ctx.holder, ctx.objective
                ));
                emit_node(child, ctx, leaf_command, child_path, out);
            }
            out.push(TreeFunction { path, commands });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Walk the tree checking the partition invariants.
    fn check_partition<T>(node: &DispatchNode<T>) {
        if let DispatchNode::Branch { min, max, children } = node {
            assert!(!children.is_empty());
            assert!(children.len() <= FANOUT);
            let mut cursor = *min;
            for child in children {
                let (lo, hi) = child.range();
                assert_eq!(lo, cursor, "gap or overlap at {cursor}");
                assert!(hi > lo);
                cursor = hi;
                check_partition(child);
            }
            assert_eq!(cursor, *max, "children do not cover the range");
        }
    }

    fn expected_depth(n: usize) -> usize {
        // ceil(log_8 n), with a single item sitting at depth 0.
        let mut depth = 0;
        let mut span = 1;
        while span < n {
            span *= FANOUT;
            depth += 1;
        }
        depth
    }

    #[test]
    fn twenty_items_make_a_two_level_tree() {
        let tree = build_tree(0..20).map(|t| t.depth());
        assert_eq!(tree, Some(2));
    }

    #[test]
    fn single_item_is_a_leaf() {
        let tree = build_tree(["only"]);
        assert_eq!(
            tree,
            Some(DispatchNode::Leaf {
                index: 0,
                item: "only"
            })
        );
    }

    #[test]
    fn empty_input_yields_no_tree() {
        assert_eq!(build_tree(Vec::<u8>::new()), None);
    }

    #[test]
    fn ranges_partition_without_gaps() {
        for n in [2, 7, 8, 9, 20, 64, 65, 100] {
            let Some(tree) = build_tree(0..n) else {
                panic!("tree for {n} items");
            };
            check_partition(&tree);
            assert_eq!(tree.range(), (0, n));
            assert_eq!(tree.depth(), expected_depth(n));
        }
    }

    #[test]
    fn emitted_root_guards_every_child() {
        let Some(tree) = build_tree(0..20) else {
            panic!("tree");
        };
        let Ok(root) = FunctionRef::new("rig", ["frames"]) else {
            panic!("ref");
        };
        let ctx = EmitContext {
            root,
            holder: "@s".to_string(),
            objective: "rig.frame".to_string(),
        };
        let funcs = emit_tree(&tree, &ctx, |i, _| format!("say frame {i}"));
        let Some(root_fn) = funcs.iter().find(|f| f.path.is_empty()) else {
            panic!("no root function");
        };
        assert_eq!(
            root_fn.commands,
            vec![
                "execute if score @s rig.frame matches 0..7 run function rig:frames/0",
                "execute if score @s rig.frame matches 8..15 run function rig:frames/1",
                "execute if score @s rig.frame matches 16..19 run function rig:frames/2",
            ]
        );
        // One function per leaf plus one per branch.
        assert_eq!(funcs.len(), 20 + 4);
    }

    proptest! {
        #[test]
        fn tree_shape_holds_for_any_size(n in 1usize..600) {
            let tree = build_tree(0..n);
            prop_assert!(tree.is_some());
            if let Some(tree) = tree {
                check_partition(&tree);
                prop_assert_eq!(tree.range(), (0, n));
                prop_assert_eq!(tree.depth(), expected_depth(n));
            }
        }
    }
}
