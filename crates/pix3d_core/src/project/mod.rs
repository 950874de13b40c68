//! Project directories: asset discovery and the recent-project list

pub mod recent;
pub mod scan;

use std::path::PathBuf;

use thiserror::Error;

pub use recent::{RecentProject, RecentProjects};
pub use scan::{scan_project, ScanReport, ScannedAsset, UnreadableEntry};

/// Project access errors
#[derive(Error, Debug)]
pub enum ProjectError {
    /// The project path is missing or not a directory
    #[error("Project path {0} is not a directory")]
    NotADirectory(PathBuf),

    /// File-system access failed
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The recent-project file could not be parsed
    #[error("Recent-project list is malformed: {0}")]
    RecentParse(#[from] ron::error::SpannedError),

    /// The recent-project file could not be encoded
    #[error("Failed to encode recent-project list: {0}")]
    RecentEncode(#[from] ron::Error),
}
