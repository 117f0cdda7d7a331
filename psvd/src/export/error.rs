use crate::catalog::CatalogError;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Why a single unit of work failed.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error("cannot {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Decrypt(#[from] psvd_media::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("unit panicked: {0}")]
    Panicked(String),
}

impl UnitError {
    pub(super) fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }
}

/// Errors that stop a run before anything is scheduled.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("cannot create output directory {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
