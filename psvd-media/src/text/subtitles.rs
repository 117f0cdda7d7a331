use std::fmt::Write;

/// A single transcript line, with times in milliseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cue {
    pub start_time: u64,
    pub end_time: u64,
    pub text: String,
}

impl Cue {
    pub fn new<T: Into<String>>(start_time: u64, end_time: u64, text: T) -> Self {
        Self {
            start_time,
            end_time,
            text: text.into(),
        }
    }

    /// Every line of the text prefixed with a dash marker.
    fn payload(&self) -> String {
        self.text
            .replace('\r', "")
            .split('\n')
            .map(|line| format!("- {line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Subtitles builder.
///
/// Cues are emitted in the order they were added, they are never re-sorted or merged.
#[derive(Clone, Debug, Default)]
pub struct Subtitles {
    cues: Vec<Cue>,
}

impl Subtitles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Build subtitles in subrip format, or `None` if there are no cues.
    pub fn as_srt(&self) -> Option<String> {
        if self.cues.is_empty() {
            return None;
        }

        let mut subtitles = String::new();

        for (i, cue) in self.cues.iter().enumerate() {
            let _ = write!(
                subtitles,
                "{}\n{} --> {}\n{}\n\n",
                i + 1,
                timestamp(cue.start_time, ','),
                timestamp(cue.end_time, ','),
                cue.payload()
            );
        }

        Some(subtitles)
    }
}

impl FromIterator<Cue> for Subtitles {
    fn from_iter<I: IntoIterator<Item = Cue>>(iter: I) -> Self {
        Self {
            cues: iter.into_iter().collect(),
        }
    }
}

/// `HH:MM:SS<sep>mmm`, hours are not wrapped at 24.
fn timestamp(millis: u64, sep: char) -> String {
    let divmod = |x, y| (x / y, x % y);
    let (s, ms) = divmod(millis, 1000);
    let (m, s) = divmod(s, 60);
    let (h, m) = divmod(m, 60);
    format!("{h:02}:{m:02}:{s:02}{sep}{ms:03}")
}
