#![cfg_attr(docsrs, feature(doc_cfg))]

//! This crate contains the byte level pipeline used to turn cached `.psv` course clips
//! back into playable files, plus a small builder for subrip subtitles behind the
//! `text` feature.
//!
//! Clips are obfuscated with a fixed positional XOR keystream (see [`cipher`]).
//! The keystream byte for a given offset only depends on that offset, so any block of
//! a file can be decrypted on its own as long as its absolute position is known.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Whole file in memory.
//!     if let Some(data) = psvd_media::load_whole_file("clip.psv")? {
//!         std::fs::write("clip.mp4", data)?;
//!     }
//!
//!     // Or streamed block by block.
//!     let mut output = File::create("clip.mp4")?;
//!     psvd_media::decrypt_to("clip.psv", &mut output)?;
//!     Ok(())
//! }
//! ```

pub mod cipher;

#[cfg(feature = "text")]
#[cfg_attr(docsrs, doc(cfg(feature = "text")))]
pub mod text;

mod error;
mod loader;
mod reader;

pub use error::Error;
pub use loader::{decrypt_to, load_whole_file};
pub use reader::SourceReader;

/// A `Result` alias where the `Err` case is `psvd_media::Error`.
pub type Result<T> = std::result::Result<T, Error>;
