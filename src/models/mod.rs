//! Data models for the board game catalog.
//!
//! Field names follow the catalog frontend so responses can be consumed as-is.

mod comment;
mod game;

pub use comment::*;
pub use game::*;
