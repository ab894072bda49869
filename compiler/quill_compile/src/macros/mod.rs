//! The control-flow and scheduling macro library.
//!
//! Each macro compiles a block construct into scoreboard/schedule command
//! text against the configured internal objective. Internal flag holders
//! are named `#quill_<kind>_<slot>`, where the slot comes from the
//! project-wide allocator so no two live macros ever share state.

pub(crate) mod conditional;
pub(crate) mod loops;
pub(crate) mod schedule;
