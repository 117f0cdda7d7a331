//! Output names and source paths derived from catalog records.
//!
//! Titles are cleaned by replacing characters that are invalid in a file name on any
//! mainstream filesystem with [`PLACEHOLDER`]. The same policy is used for every level
//! of the output tree.

use crate::catalog::Course;
use base64::Engine;
use md5::{Digest, Md5};

/// Replacement for characters that cannot appear in a path segment.
pub const PLACEHOLDER: char = '_';

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Device names Windows reserves regardless of extension.
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Zero pad an index to at least two digits.
pub fn index_to_segment(index: i64) -> String {
    format!("{index:02}")
}

/// Turn a title into a safe path segment, or `None` if nothing usable is left.
///
/// Control characters and [`INVALID_CHARS`] become [`PLACEHOLDER`]. Leading and
/// trailing whitespace is dropped, as are trailing dots which Windows silently strips.
/// Reserved device names such as `CON` or `nul.txt` get [`PLACEHOLDER`] appended to
/// their stem.
pub fn sanitize_title(title: &str) -> Option<String> {
    let sanitized = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_control() || INVALID_CHARS.contains(&c) {
                PLACEHOLDER
            } else {
                c
            }
        })
        .collect::<String>();
    let sanitized = sanitized.trim_end_matches(['.', ' ']);

    if sanitized.is_empty() {
        return None;
    }

    let stem_len = sanitized.find('.').unwrap_or(sanitized.len());
    let mut sanitized = sanitized.to_owned();

    if is_reserved(&sanitized[..stem_len]) {
        sanitized.insert(stem_len, PLACEHOLDER);
    }

    Some(sanitized)
}

fn is_reserved(stem: &str) -> bool {
    let stem = stem.trim_end();
    RESERVED_NAMES.iter().any(|x| x.eq_ignore_ascii_case(stem))
}

/// `<index>. <title>` for modules and clips, falling back to the record name and
/// then to the bare index when the title sanitizes to nothing.
pub fn entry_name(index: i64, title: &str, fallback: &str) -> String {
    match sanitize_title(title).or_else(|| sanitize_title(fallback)) {
        Some(name) => format!("{}. {}", index_to_segment(index), name),
        None => index_to_segment(index),
    }
}

/// Output directory name of a course.
pub fn course_dir_name(course: &Course) -> String {
    sanitize_title(&course.title)
        .or_else(|| sanitize_title(&course.name))
        .unwrap_or_else(|| "untitled".to_owned())
}

/// Name of the directory holding a module's clips under its course directory.
///
/// `base64(md5("<name>|<author handle>"))` with `/` replaced by `_`.
pub fn module_hash(name: &str, author_handle: &str) -> String {
    let digest = Md5::digest(format!("{name}|{author_handle}").as_bytes());
    base64::engine::general_purpose::STANDARD
        .encode(digest)
        .replace('/', "_")
}
