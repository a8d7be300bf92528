//! Listening-history reconstruction
//!
//! Turns a decoded track list into discrete, time-ordered play events.

mod assembler;
mod expander;

pub use assembler::{assemble_history, load_history};
pub use expander::expand_track;
