//! Subtitles text processing.

mod subtitles;

pub use subtitles::{Cue, Subtitles};
