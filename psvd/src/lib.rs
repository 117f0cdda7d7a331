//! Export courses cached by the offline psv viewer into a plain directory tree.
//!
//! The viewer keeps a SQLite [`catalog`] describing courses, modules, clips and clip
//! transcripts next to a `courses` directory holding obfuscated `.psv` clip files.
//! [`export::Exporter`] walks the catalog, decrypts every clip it can find with
//! [`psvd_media`] and writes subtitles and JSON metadata alongside:
//!
//! ```text
//! output/
//! └── Course Title/
//!     ├── image.jpg
//!     ├── course-info.json
//!     └── 01. Module Title/
//!         ├── module-info.json
//!         ├── clip-info.json
//!         ├── 01. Clip Title.mp4
//!         └── 01. Clip Title.srt
//! ```

pub mod catalog;
pub mod config;
pub mod export;
pub mod naming;

mod commands;
mod logger;

#[doc(hidden)]
pub use commands::Args;
