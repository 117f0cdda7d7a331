//! Locating the viewer's install directory.

use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Product directory under the per-user local data directory.
pub const PRODUCT_DIR: &str = "pluralsight";
/// Catalog database file name inside the install directory.
pub const CATALOG_FILE: &str = "pluralsight.db";
/// Directory holding one sub-directory per downloaded course.
pub const COURSES_DIR: &str = "courses";
/// Environment variable overriding the install directory.
pub const SOURCE_ENV: &str = "PSV";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "cannot determine the local data directory, declare the PSV environment variable instead"
    )]
    NoDataDir,

    #[error(
        "install directory {} not found, is the viewer installed or is the PSV environment variable declared?",
        .0.display()
    )]
    RootNotFound(PathBuf),

    #[error("catalog database {} not found", .0.display())]
    CatalogNotFound(PathBuf),

    #[error("no downloaded courses found in {}, did you download any courses first?", .0.display())]
    NoCourses(PathBuf),

    #[error("cannot list {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A validated install directory.
#[derive(Clone, Debug)]
pub struct Installation {
    pub root: PathBuf,
    pub catalog: PathBuf,
    pub courses: PathBuf,
    /// Course directories present on disk, sorted by name.
    pub course_dirs: Vec<PathBuf>,
}

impl Installation {
    /// Validate `root`, or the default install directory when `None`.
    pub fn discover(root: Option<PathBuf>) -> Result<Self, ConfigError> {
        match root {
            Some(root) => Self::at(root),
            None => Self::at(default_root()?),
        }
    }

    pub fn at<P: Into<PathBuf>>(root: P) -> Result<Self, ConfigError> {
        let root = root.into();
        let catalog = root.join(CATALOG_FILE);
        let courses = root.join(COURSES_DIR);

        if !root.is_dir() {
            return Err(ConfigError::RootNotFound(root));
        }

        if !catalog.is_file() {
            return Err(ConfigError::CatalogNotFound(catalog));
        }

        if !courses.is_dir() {
            return Err(ConfigError::NoCourses(courses));
        }

        let course_dirs = list_dirs(&courses)?;

        if course_dirs.is_empty() {
            return Err(ConfigError::NoCourses(courses));
        }

        Ok(Self {
            root,
            catalog,
            courses,
            course_dirs,
        })
    }
}

/// `<local data dir>/pluralsight`.
pub fn default_root() -> Result<PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|x| x.join(PRODUCT_DIR))
        .ok_or(ConfigError::NoDataDir)
}

/// `output` next to the running executable, or in the working directory if the
/// executable path is unknown.
pub fn default_output_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|x| x.parent().map(|x| x.join("output")))
        .unwrap_or_else(|| PathBuf::from("output"))
}

fn list_dirs(path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut dirs = Vec::new();

    for entry in fs::read_dir(path).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();

        if path.is_dir() {
            dirs.push(path);
        }
    }

    dirs.sort();
    Ok(dirs)
}
