use psvd_media::text::Cue;
use serde::Serialize;

// Field names are serialized exactly as the viewer's catalog names them.

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Course {
    pub authors_fullnames: Option<String>,
    pub default_image_url: Option<String>,
    pub description: Option<String>,
    pub duration_in_milliseconds: i64,
    pub has_transcript: Option<bool>,
    pub image_url: Option<String>,
    pub is_stale: Option<bool>,
    pub level: Option<String>,
    pub name: String,
    pub release_date: Option<String>,
    pub short_description: Option<String>,
    pub title: String,
    pub updated_date: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Module {
    pub author_handle: String,
    pub course_name: String,
    pub description: Option<String>,
    pub duration_in_milliseconds: i64,
    pub id: i64,
    pub module_index: i64,
    pub name: String,
    pub title: String,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Clip {
    pub clip_index: i64,
    pub duration_in_milliseconds: i64,
    pub id: i64,
    pub module_id: i64,
    pub name: String,
    pub supports_standard: bool,
    pub supports_widescreen: bool,
    pub title: String,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClipTranscript {
    pub clip_id: i64,
    pub end_time: i64,
    pub id: i64,
    pub start_time: i64,
    pub text: String,
}

impl From<ClipTranscript> for Cue {
    fn from(line: ClipTranscript) -> Self {
        let millis = |x: i64| u64::try_from(x).unwrap_or(0);
        Cue::new(millis(line.start_time), millis(line.end_time), line.text)
    }
}
