//! Recursive project directory scan
//!
//! Every file whose extension maps to a category becomes a registry entry:
//! the key is the path relative to the project root with `/` separators and
//! the locator is the absolute path.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::assets::{AssetCategory, AssetRegistry};
use crate::core::config::AssetConfig;

use super::ProjectError;

/// A discovered asset file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedAsset {
    /// Registry category
    pub category: AssetCategory,
    /// Relative path key
    pub key: String,
    /// Absolute path
    pub locator: String,
}

/// A directory entry the walk could not read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableEntry {
    /// Offending path, when known
    pub path: Option<PathBuf>,
    /// Error description
    pub reason: String,
}

/// Result of a project scan
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Absolute project root
    pub root: PathBuf,
    /// Tracked files in walk order
    pub assets: Vec<ScannedAsset>,
    /// Entries skipped because they could not be read
    pub unreadable: Vec<UnreadableEntry>,
    /// Files with untracked extensions
    pub ignored: usize,
}

impl ScanReport {
    /// Register every discovered asset
    pub fn register_into(&self, registry: &mut AssetRegistry) {
        for asset in &self.assets {
            registry.add_asset(asset.category.clone(), asset.key.clone(), asset.locator.clone());
        }
    }

    /// Discovered assets of one category
    pub fn in_category<'a>(&'a self, category: &'a AssetCategory) -> impl Iterator<Item = &'a ScannedAsset> + 'a {
        self.assets.iter().filter(move |asset| &asset.category == category)
    }
}

/// Walk `root` and categorize every file by extension
pub fn scan_project(root: impl AsRef<Path>, config: &AssetConfig) -> Result<ScanReport, ProjectError> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(ProjectError::NotADirectory(root.to_path_buf()));
    }
    let root = fs::canonicalize(root).map_err(|source| ProjectError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let mut report = ScanReport {
        root: root.clone(),
        ..Default::default()
    };

    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable project entry: {}", e);
                report.unreadable.push(UnreadableEntry {
                    path: e.path().map(Path::to_path_buf),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let category = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| config.category_for_extension(ext));
        let Some(category) = category else {
            report.ignored += 1;
            continue;
        };
        let Ok(relative) = path.strip_prefix(&root) else {
            continue;
        };

        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        log::debug!("Found {} asset '{}'", category, key);
        report.assets.push(ScannedAsset {
            category: AssetCategory::from(category),
            key,
            locator: path.to_string_lossy().into_owned(),
        });
    }

    log::info!(
        "Scanned project {}: {} asset(s), {} ignored, {} unreadable",
        root.display(),
        report.assets.len(),
        report.ignored,
        report.unreadable.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_scan_categorizes_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("models/robot.glb"));
        touch(&dir.path().join("models/props/Barrel.GLTF"));
        touch(&dir.path().join("textures/grass.png"));
        touch(&dir.path().join("levels/one.json"));
        touch(&dir.path().join("audio/hit.wav"));
        touch(&dir.path().join("notes.txt"));

        let report = scan_project(dir.path(), &AssetConfig::default()).unwrap();
        let models: Vec<_> = report.in_category(&AssetCategory::Models).map(|a| a.key.as_str()).collect();
        assert_eq!(models, ["models/props/Barrel.GLTF", "models/robot.glb"]);
        assert_eq!(report.in_category(&AssetCategory::Textures).count(), 1);
        assert_eq!(report.in_category(&AssetCategory::Scenes).count(), 1);
        assert_eq!(report.in_category(&AssetCategory::Sounds).count(), 1);
        assert_eq!(report.ignored, 1);
        assert!(report.assets.iter().all(|a| Path::new(&a.locator).is_absolute()));
    }

    #[test]
    fn test_register_into_uses_keys_and_absolute_locators() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("robot.glb"));
        let report = scan_project(dir.path(), &AssetConfig::default()).unwrap();

        let mut registry = AssetRegistry::new();
        report.register_into(&mut registry);
        let locator = registry.get(&AssetCategory::Models, "robot.glb").unwrap();
        assert_eq!(Path::new(locator), report.root.join("robot.glb"));
    }

    #[test]
    fn test_scan_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = scan_project(dir.path().join("nope"), &AssetConfig::default());
        assert!(matches!(result, Err(ProjectError::NotADirectory(_))));
    }
}
