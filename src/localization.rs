//! Keyed string tables
//!
//! Every player-facing string goes through a [`Localization`] lookup. Missing
//! keys never fail: the key itself is returned so the HUD always has text.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Keyed text lookup
pub trait Localization {
    fn get_string(&self, key: &str) -> String;
    fn set_language(&mut self, _language: &str) {}
}

/// Default language code
pub const DEFAULT_LANGUAGE: &str = "en";

/// Built-in English strings
const ENGLISH: &[(&str, &str)] = &[
    ("HUD Time", "Time: {0}"),
    ("HUD Count", "{0} left: {1}"),
    ("HUD Rank", "Rank: {0}"),
    ("Rank Gold", "Gold"),
    ("Rank Silver", "Silver"),
    ("Rank Bronze", "Bronze"),
    ("Go", "Go!"),
    ("Finished", "Finished!"),
    ("Collection", "Collect {0} {1} things!"),
    ("Level Complete", "Level Complete!"),
    ("Goal", "Roll through the goal to finish!"),
    ("Small", "Small"),
    ("Medium", "Medium"),
    ("Large", "Large"),
];

/// Per-language string tables with a selected language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StringTable {
    language: String,
    tables: HashMap<String, HashMap<String, String>>,
}

impl Default for StringTable {
    fn default() -> Self {
        let english = ENGLISH
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut tables = HashMap::new();
        tables.insert(DEFAULT_LANGUAGE.to_string(), english);
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            tables,
        }
    }
}

impl StringTable {
    /// Parse `{"lang": {"key": "text", ...}, ...}` and merge it over the built-ins
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let parsed: HashMap<String, HashMap<String, String>> = serde_json::from_str(json)?;
        let mut table = Self::default();
        for (language, strings) in parsed {
            table.tables.entry(language).or_default().extend(strings);
        }
        Ok(table)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Languages with at least one string
    pub fn languages(&self) -> Vec<&str> {
        let mut langs: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        langs.sort_unstable();
        langs
    }

    /// Switch language. Unknown languages are accepted and fall back per key.
    pub fn select_language(&mut self, language: &str) {
        if !self.tables.contains_key(language) {
            log::warn!("No strings for language '{}', falling back to '{}'", language, DEFAULT_LANGUAGE);
        }
        self.language = language.to_string();
    }

    pub fn insert(&mut self, language: &str, key: &str, text: &str) {
        self.tables
            .entry(language.to_string())
            .or_default()
            .insert(key.to_string(), text.to_string());
    }
}

impl Localization for StringTable {
    fn get_string(&self, key: &str) -> String {
        let lookup = |lang: &str| self.tables.get(lang).and_then(|t| t.get(key));
        match lookup(&self.language).or_else(|| lookup(DEFAULT_LANGUAGE)) {
            Some(text) => text.clone(),
            None => {
                log::debug!("Missing string for key '{}'", key);
                key.to_string()
            }
        }
    }

    fn set_language(&mut self, language: &str) {
        self.select_language(language);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_english() {
        let table = StringTable::default();
        assert_eq!(table.language(), DEFAULT_LANGUAGE);
        assert_eq!(table.get_string("Go"), "Go!");
        assert_eq!(table.get_string("Rank Silver"), "Silver");
    }

    #[test]
    fn test_missing_key_echoes_key() {
        let table = StringTable::default();
        assert_eq!(table.get_string("Rank Platinum"), "Rank Platinum");
    }

    #[test]
    fn test_language_fallback_to_english() {
        let json = r#"{ "fr": { "Go": "Partez !" } }"#;
        let mut table = StringTable::from_json(json).unwrap();
        table.select_language("fr");
        assert_eq!(table.language(), "fr");
        assert_eq!(table.get_string("Go"), "Partez !");
        assert_eq!(table.get_string("Rank Gold"), "Gold");
        assert_eq!(table.languages(), vec!["en", "fr"]);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(StringTable::from_json("{ not json").is_err());
    }
}
