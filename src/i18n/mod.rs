//! Internationalization (i18n) module.
//!
//! Templates are embedded at compile time and rendered through the
//! [`TextProvider`] capability handed to the verification handlers.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use crate::utils::fill_placeholders;
use crate::verification::TextProvider;

const DEFAULT_LANG: &str = "en";

/// Loaded templates: LangCode -> Key -> Text.
#[derive(Debug, Clone)]
pub struct Translations {
    langs: HashMap<String, Value>,
}

impl Translations {
    /// Load the embedded English templates.
    pub fn english() -> Self {
        let mut langs = HashMap::new();

        match serde_json::from_str(include_str!("en.json")) {
            Ok(val) => {
                langs.insert(DEFAULT_LANG.to_string(), val);
            }
            Err(e) => warn!("Embedded en.json is invalid: {}", e),
        }

        Self { langs }
    }

    /// Get text for a key, falling back to the key itself.
    /// Supports nested keys via dot notation, e.g. "errors.network".
    pub fn get_text(&self, key: &str) -> String {
        self.langs
            .get(DEFAULT_LANG)
            .and_then(|val| resolve_key(val, key))
            .unwrap_or_else(|| key.to_string())
    }
}

impl TextProvider for Translations {
    fn render(&self, key: &str, params: &[(&str, &str)]) -> String {
        fill_placeholders(&self.get_text(key), params)
    }
}

fn resolve_key(val: &Value, key: &str) -> Option<String> {
    let mut current = val;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    current.as_str().map(|s| s.to_string())
}
