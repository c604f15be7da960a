//! User-supplied description → category mapping.
//!
//! Matching is exact on the whole normalized description, ignoring case. No
//! substring or fuzzy matching: a merchant either has an entry or it ends up
//! in [`UNCATEGORIZED`].

use daric_core::UNCATEGORIZED;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;

use crate::error::ConfigError;
use crate::util::{description_key, normalize_description};

/// Either shape is accepted per JSON entry:
/// `{"Uber": "Transport"}` or `{"Transport": ["Uber", "99 Taxi"]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryEntry {
    Category(String),
    Descriptions(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    entries: HashMap<String, String>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, CategoryEntry> = serde_json::from_str(json)?;
        Self::from_entries(raw)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, CategoryEntry> = serde_json::from_reader(reader)?;
        Self::from_entries(raw)
    }

    fn from_entries(raw: BTreeMap<String, CategoryEntry>) -> Result<Self, ConfigError> {
        let mut map = CategoryMap::new();
        for (key, entry) in raw {
            match entry {
                CategoryEntry::Category(category) => map.insert(&key, &category)?,
                CategoryEntry::Descriptions(descriptions) => {
                    for description in descriptions {
                        map.insert(&description, &key)?;
                    }
                }
            }
        }
        Ok(map)
    }

    /// Adds one mapping. Re-adding the same pair is a no-op; mapping a
    /// description to a second category is rejected.
    pub fn insert(&mut self, description: &str, category: &str) -> Result<(), ConfigError> {
        let key = description_key(description);
        let category = normalize_description(category);
        if key.is_empty() || category.is_empty() {
            return Err(ConfigError::EmptyEntry(format!("{description}: {category}")));
        }

        match self.entries.get(&key) {
            Some(existing) if *existing != category => Err(ConfigError::Conflict {
                description: description.to_string(),
                first: existing.clone(),
                second: category,
            }),
            Some(_) => Ok(()),
            None => {
                self.entries.insert(key, category);
                Ok(())
            }
        }
    }

    pub fn get(&self, description: &str) -> Option<&str> {
        self.entries.get(&description_key(description)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Category label for `description`; never fails.
pub fn resolve_category<'a>(description: &str, map: Option<&'a CategoryMap>) -> &'a str {
    map.and_then(|m| m.get(description)).unwrap_or(UNCATEGORIZED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let map = CategoryMap::from_json(r#"{"uber": "Transport"}"#).unwrap();
        for description in ["Uber", "UBER", "uber"] {
            assert_eq!(resolve_category(description, Some(&map)), "Transport");
        }
    }

    #[test]
    fn lookup_normalizes_whitespace() {
        let map = CategoryMap::from_json(r#"{"  Grocery   Store ": "Food"}"#).unwrap();
        assert_eq!(resolve_category("grocery store", Some(&map)), "Food");
    }

    #[test]
    fn no_substring_matching() {
        let map = CategoryMap::from_json(r#"{"uber": "Transport"}"#).unwrap();
        assert_eq!(resolve_category("Uber Eats", Some(&map)), UNCATEGORIZED);
        assert_eq!(resolve_category("ube", Some(&map)), UNCATEGORIZED);
    }

    #[test]
    fn no_map_means_uncategorized() {
        assert_eq!(resolve_category("Anything", None), UNCATEGORIZED);
    }

    #[test]
    fn grouped_shape_is_accepted() {
        let map = CategoryMap::from_json(r#"{"Transport": ["Uber", "99 Taxi"], "Rent": "Housing"}"#)
            .unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("99 TAXI"), Some("Transport"));
        assert_eq!(map.get("rent"), Some("Housing"));
    }

    #[test]
    fn conflicting_entries_are_rejected() {
        let result = CategoryMap::from_json(r#"{"UBER": "Transport", "uber": "Leisure"}"#);
        assert!(matches!(result, Err(ConfigError::Conflict { .. })));
    }

    #[test]
    fn repeated_identical_entries_are_fine() {
        let map = CategoryMap::from_json(r#"{"Uber": "Transport", "Transport": ["uber"]}"#).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(CategoryMap::from_json("{not json"), Err(ConfigError::Json(_))));
        assert!(matches!(CategoryMap::from_json(r#"{"uber": 3}"#), Err(ConfigError::Json(_))));
        assert!(matches!(CategoryMap::from_json(r#"["uber"]"#), Err(ConfigError::Json(_))));
    }

    #[test]
    fn empty_entries_are_rejected() {
        assert!(matches!(
            CategoryMap::from_json(r#"{"": "Transport"}"#),
            Err(ConfigError::EmptyEntry(_))
        ));
    }

    #[test]
    fn from_reader_reads_json() {
        let map = CategoryMap::from_reader(r#"{"Netflix": "Subscriptions"}"#.as_bytes()).unwrap();
        assert_eq!(map.get("netflix"), Some("Subscriptions"));
    }
}
