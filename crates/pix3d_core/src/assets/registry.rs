//! Category × key → locator table

use std::collections::{BTreeMap, HashMap};

use super::AssetCategory;

/// Locators of every asset the session knows about
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    categories: HashMap<AssetCategory, BTreeMap<String, String>>,
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetRegistry {
    /// Registry with the four standard categories, all empty
    pub fn new() -> Self {
        Self {
            categories: AssetCategory::STANDARD
                .into_iter()
                .map(|category| (category, BTreeMap::new()))
                .collect(),
        }
    }

    /// Insert or overwrite an entry
    pub fn add_asset(&mut self, category: AssetCategory, key: impl Into<String>, locator: impl Into<String>) {
        let key = key.into();
        let entries = self.categories.entry(category.clone()).or_default();
        if entries.insert(key.clone(), locator.into()).is_some() {
            log::debug!("Overwrote {} asset '{}'", category, key);
        } else {
            log::info!("Registered {} asset '{}'", category, key);
        }
    }

    /// Delete an entry, returning its locator
    pub fn remove_asset(&mut self, category: &AssetCategory, key: &str) -> Option<String> {
        let removed = self.categories.get_mut(category).and_then(|entries| entries.remove(key));
        if removed.is_none() {
            log::warn!("Cannot remove {} asset '{}': not registered", category, key);
        }
        removed
    }

    /// Empty one category
    pub fn clear_category(&mut self, category: &AssetCategory) {
        match self.categories.get_mut(category) {
            Some(entries) => entries.clear(),
            None => log::warn!("Cannot clear unknown asset category '{}'", category),
        }
    }

    /// Empty every category, keeping the standard ones present
    pub fn clear(&mut self) {
        for entries in self.categories.values_mut() {
            entries.clear();
        }
    }

    /// Locator for one entry
    pub fn get(&self, category: &AssetCategory, key: &str) -> Option<&str> {
        self.categories.get(category)?.get(key).map(String::as_str)
    }

    /// Whether an entry exists
    pub fn contains(&self, category: &AssetCategory, key: &str) -> bool {
        self.get(category, key).is_some()
    }

    /// Live entries of a category
    pub fn category(&self, category: &AssetCategory) -> Option<&BTreeMap<String, String>> {
        self.categories.get(category)
    }

    /// Live entries of a category for in-place edits
    pub fn category_mut(&mut self, category: &AssetCategory) -> Option<&mut BTreeMap<String, String>> {
        self.categories.get_mut(category)
    }

    /// Entries of a category as owned `(key, locator)` pairs
    pub fn entries(&self, category: &AssetCategory) -> Vec<(String, String)> {
        self.category(category)
            .map(|entries| entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Total number of entries across categories
    pub fn len(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    /// Whether no entry is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
