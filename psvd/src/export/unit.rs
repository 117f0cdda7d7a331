use super::error::UnitError;
use crate::catalog::{Clip, Course, Module};
use log::debug;
use psvd_media::text::Subtitles;
use serde::Serialize;
use std::{
    ffi::OsString,
    fmt,
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    CreateDirectory,
    ReadCatalog,
    CopyImage,
    CourseInfo,
    ModuleInfo,
    ClipInfo,
    DecryptClip,
    Subtitles,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateDirectory => "create directory",
            Self::ReadCatalog => "read catalog for",
            Self::CopyImage => "copy image",
            Self::CourseInfo => "write course info",
            Self::ModuleInfo => "write module info",
            Self::ClipInfo => "write clip info",
            Self::DecryptClip => "decrypt clip",
            Self::Subtitles => "write subtitles",
        })
    }
}

/// How a unit that did not fail ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// Nothing to do, with the reason logged as a warning.
    Skipped(String),
    /// Never started because the run was cancelled.
    Cancelled,
}

/// An independent piece of work scheduled on the worker pool.
///
/// Every unit owns what it needs and writes to a path no other unit touches.
#[derive(Debug)]
pub enum Unit {
    CopyImage { source: PathBuf, target: PathBuf },
    CourseInfo { course: Course, target: PathBuf },
    ModuleInfo { module: Module, target: PathBuf },
    ClipInfo { clips: Vec<Clip>, target: PathBuf },
    DecryptClip { source: PathBuf, target: PathBuf },
    Subtitles { subtitles: Subtitles, target: PathBuf },
}

impl Unit {
    pub fn kind(&self) -> UnitKind {
        match self {
            Self::CopyImage { .. } => UnitKind::CopyImage,
            Self::CourseInfo { .. } => UnitKind::CourseInfo,
            Self::ModuleInfo { .. } => UnitKind::ModuleInfo,
            Self::ClipInfo { .. } => UnitKind::ClipInfo,
            Self::DecryptClip { .. } => UnitKind::DecryptClip,
            Self::Subtitles { .. } => UnitKind::Subtitles,
        }
    }

    pub fn target(&self) -> &Path {
        match self {
            Self::CopyImage { target, .. }
            | Self::CourseInfo { target, .. }
            | Self::ModuleInfo { target, .. }
            | Self::ClipInfo { target, .. }
            | Self::DecryptClip { target, .. }
            | Self::Subtitles { target, .. } => target,
        }
    }

    pub fn execute(&self) -> Result<Outcome, UnitError> {
        match self {
            Self::CopyImage { source, target } => copy_image(source, target),
            Self::CourseInfo { course, target } => write_json(course, target),
            Self::ModuleInfo { module, target } => write_json(module, target),
            Self::ClipInfo { clips, target } => write_json(clips, target),
            Self::DecryptClip { source, target } => decrypt_clip(source, target),
            Self::Subtitles { subtitles, target } => write_subtitles(subtitles, target),
        }
    }
}

fn copy_image(source: &Path, target: &Path) -> Result<Outcome, UnitError> {
    if !source.is_file() {
        return Ok(Outcome::Skipped(format!(
            "No course image found in {}, skipping.",
            parent_display(source)
        )));
    }

    if target.exists() {
        debug!("Course image {} already copied.", target.display());
        return Ok(Outcome::Done);
    }

    fs::copy(source, target).map_err(UnitError::io("copy image to", target))?;
    debug!("Copied course image to {}.", target.display());
    Ok(Outcome::Done)
}

fn write_json<T: Serialize + ?Sized>(value: &T, target: &Path) -> Result<Outcome, UnitError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(target, json).map_err(UnitError::io("write", target))?;
    debug!("Saved {}.", target.display());
    Ok(Outcome::Done)
}

fn decrypt_clip(source: &Path, target: &Path) -> Result<Outcome, UnitError> {
    if !source.exists() {
        return Ok(Outcome::Skipped(format!(
            "Source file {} not found, skipping.",
            source.display()
        )));
    }

    // Written next to the target and renamed once complete.
    let mut part = OsString::from(target.as_os_str());
    part.push(".part");
    let part = PathBuf::from(part);

    let result = write_decrypted(source, &part).and_then(|written| {
        if written > 0 {
            fs::rename(&part, target).map_err(UnitError::io("rename to", target))?;
        }
        Ok(written)
    });

    match result {
        Ok(0) => {
            let _ = fs::remove_file(&part);
            Ok(Outcome::Skipped(format!(
                "Source file {} is empty, skipping.",
                source.display()
            )))
        }
        Ok(_) => {
            debug!("Decrypted clip {}.", file_name(target));
            Ok(Outcome::Done)
        }
        Err(e) => {
            let _ = fs::remove_file(&part);

            match e {
                UnitError::Decrypt(e) if e.is_source_err() => {
                    Ok(Outcome::Skipped(format!("{e}, skipping.")))
                }
                e => Err(e),
            }
        }
    }
}

fn write_decrypted(source: &Path, part: &Path) -> Result<u64, UnitError> {
    let file = File::create(part).map_err(UnitError::io("create", part))?;
    let mut writer = BufWriter::new(file);
    Ok(psvd_media::decrypt_to(source, &mut writer)?)
}

fn write_subtitles(subtitles: &Subtitles, target: &Path) -> Result<Outcome, UnitError> {
    let Some(srt) = subtitles.as_srt() else {
        return Ok(Outcome::Done);
    };

    fs::write(target, srt).map_err(UnitError::io("write", target))?;
    debug!("Saved {} subtitles.", file_name(target));
    Ok(Outcome::Done)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parent_display(path: &Path) -> String {
    path.parent()
        .map(|x| x.display().to_string())
        .unwrap_or_default()
}
