//! Most-recently-opened project list, persisted as RON

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ProjectError;

/// One remembered project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentProject {
    /// Project root
    pub path: PathBuf,
    /// Display name, the directory name
    pub name: String,
}

/// Bounded list, most recent first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentProjects {
    #[serde(skip, default = "default_limit")]
    limit: usize,
    entries: Vec<RecentProject>,
}

fn default_limit() -> usize {
    5
}

impl Default for RecentProjects {
    fn default() -> Self {
        Self::new(default_limit())
    }
}

impl RecentProjects {
    /// Empty list holding at most `limit` entries
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            entries: Vec::new(),
        }
    }

    /// Read the list; a missing file yields an empty list
    pub fn load(path: impl AsRef<Path>, limit: usize) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new(limit));
        }
        let contents = fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut list: Self = ron::from_str(&contents)?;
        list.limit = limit.max(1);
        list.entries.truncate(list.limit);
        Ok(list)
    }

    /// Write the list, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref();
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ProjectError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, contents).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Move a project to the front, dropping duplicates and overflow
    pub fn remember(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.entries.retain(|entry| entry.path != path);
        let name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy().into_owned(), |n| n.to_string_lossy().into_owned());
        self.entries.insert(0, RecentProject { path, name });
        self.entries.truncate(self.limit);
    }

    /// Drop a project that could not be reopened
    pub fn forget(&mut self, path: &Path) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.path != path);
        before != self.entries.len()
    }

    /// Entries, most recent first
    pub fn entries(&self) -> &[RecentProject] {
        &self.entries
    }

    /// Maximum number of entries kept
    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remember_dedupes_and_caps() {
        let mut recent = RecentProjects::new(2);
        recent.remember("/work/a");
        recent.remember("/work/b");
        recent.remember("/work/a");
        recent.remember("/work/c");

        let names: Vec<_> = recent.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["c", "a"]);
    }

    #[test]
    fn test_forget() {
        let mut recent = RecentProjects::default();
        recent.remember("/work/a");
        assert!(recent.forget(Path::new("/work/a")));
        assert!(!recent.forget(Path::new("/work/a")));
        assert!(recent.entries().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("recent.ron");
        let mut recent = RecentProjects::new(5);
        recent.remember("/work/a");
        recent.remember("/work/b");
        recent.save(&path).unwrap();

        let loaded = RecentProjects::load(&path, 1).unwrap();
        assert_eq!(loaded.entries().len(), 1);
        assert_eq!(loaded.entries()[0].name, "b");
        assert_eq!(loaded.limit(), 1);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = RecentProjects::load(dir.path().join("none.ron"), 5).unwrap();
        assert!(loaded.entries().is_empty());
    }
}
