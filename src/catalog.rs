//! Item display catalog - maps raw item ids to human readable names
//!
//! Loaded once at startup; the sync channel is not opened until it is available.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::CatalogError;

/// Immutable item id -> display name mapping
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    names: HashMap<String, String>,
}

/// Trailing "/<integer>" damage or variant value
fn variant_suffix() -> &'static Regex {
    static VARIANT_SUFFIX: OnceLock<Regex> = OnceLock::new();
    VARIANT_SUFFIX.get_or_init(|| Regex::new(r"/-?\d+$").unwrap())
}

impl ItemCatalog {
    pub fn new(names: HashMap<String, String>) -> Self {
        ItemCatalog { names }
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let names: HashMap<String, String> = serde_json::from_str(text)?;
        Ok(Self::new(names))
    }

    /// Load from a local JSON file
    pub fn load_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Fetch from the dashboard host
    pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<Self, CatalogError> {
        let text = client.get(url).send().await?.error_for_status()?.text().await?;
        Self::from_json(&text)
    }

    /// Display name for an item, falling back to the base variant `/0`
    pub fn display_name(&self, item_id: &str) -> Option<&str> {
        if let Some(name) = self.names.get(item_id) {
            return Some(name.as_str());
        }
        let suffix = variant_suffix();
        if !suffix.is_match(item_id) {
            return None;
        }
        let base = suffix.replace(item_id, "/0");
        self.names.get(&*base).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn catalog() -> ItemCatalog {
        ItemCatalog::from_json(r#"{"wood/0": "Oak Log", "stone/2": "Diorite"}"#).unwrap()
    }

    #[test]
    fn test_unknown_variant_falls_back_to_base() {
        let catalog = catalog();
        assert_eq!(catalog.display_name("wood/7"), Some("Oak Log"));
        assert_eq!(catalog.display_name("wood/0"), Some("Oak Log"));
    }

    #[test]
    fn test_missing_base_entry_has_no_name() {
        let catalog = catalog();
        assert_eq!(catalog.display_name("stone/5"), None);
        assert_eq!(catalog.display_name("glass"), None);
        assert_eq!(catalog.display_name("stone/2"), Some("Diorite"));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"iron/0": "Iron Ingot"}}"#).unwrap();
        let catalog = ItemCatalog::load_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.display_name("iron/3"), Some("Iron Ingot"));
    }

    #[test]
    fn test_rejects_non_mapping() {
        assert!(matches!(ItemCatalog::from_json("[1]"), Err(CatalogError::Parse(_))));
        assert!(matches!(
            ItemCatalog::load_file(Path::new("/nonexistent/items.json")),
            Err(CatalogError::Read { .. })
        ));
    }
}
