//! Dialogue Engine: branching dialogue scripts for games.
//!
//! Parses a line-oriented dialogue script into an immutable graph of
//! story nodes (speaker lines, narration lines, and choice sets), then
//! walks that graph one step at a time through lightweight interactor
//! cursors that expose the current line and, at branch points, the
//! selectable choices.

pub mod core;
pub mod schema;
