//! Rendering: frame assembly onto a [`Display`].
//!
//! Layout of a frame:
//! - Text area: the viewport's row plan. Optional line-number gutter on the first screen row
//!   of each buffer row, soft wrap at the text width, `~` below the end of the buffer.
//! - Status row: the row after the text area (see [`status`]).
//!
//! `RenderEngine` keeps the last painted text of every row and only repaints rows that changed.
//! The cursor is shown at its projected position, or at the end of the command line while one is
//! being typed.

pub mod display;
pub mod render_engine;
pub mod status;

pub use display::{CrosstermDisplay, Display, MemoryDisplay};
pub use render_engine::RenderEngine;
pub use status::{StatusContext, StatusSegment, build_status};
