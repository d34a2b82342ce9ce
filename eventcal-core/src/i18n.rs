//! Message translation and display escaping.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{EventCalError, EventCalResult};

pub const ADD_TO_MY_CALENDAR_RESPONSE: &str = "event_calendar:add_to_my_calendar_response";
pub const ADD_TO_MY_CALENDAR_ERROR: &str = "event_calendar:add_to_my_calendar_error";
pub const REMOVE_FROM_MY_CALENDAR_RESPONSE: &str =
    "event_calendar:remove_from_my_calendar_response";

const ENGLISH: &[(&str, &str)] = &[
    (
        ADD_TO_MY_CALENDAR_RESPONSE,
        "This event has been added to your personal calendar.",
    ),
    (
        ADD_TO_MY_CALENDAR_ERROR,
        "This event could not be added to your personal calendar. It may be full or overlap another event in your calendar.",
    ),
    (
        REMOVE_FROM_MY_CALENDAR_RESPONSE,
        "This event has been removed from your personal calendar.",
    ),
];

/// Resolves message keys to display text.
pub trait Translator {
    /// Translate `key`, returning the key itself when no message exists.
    fn translate(&self, key: &str) -> String;
}

/// Key/value message catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

#[derive(Deserialize)]
struct LanguageFile {
    #[serde(default)]
    messages: HashMap<String, String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::english()
    }
}

impl Catalog {
    pub fn empty() -> Self {
        Catalog {
            messages: HashMap::new(),
        }
    }

    /// Built-in English texts for the calendar actions.
    pub fn english() -> Self {
        let messages = ENGLISH
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Catalog { messages }
    }

    /// Load a TOML language file on top of the English texts.
    ///
    /// ```toml
    /// [messages]
    /// "event_calendar:region:north" = "Northern region"
    /// ```
    pub fn load(path: &Path) -> EventCalResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: LanguageFile = toml::from_str(&content)
            .map_err(|e| EventCalError::Config(format!("{}: {e}", path.display())))?;

        let mut catalog = Self::english();
        catalog.messages.extend(file.messages);
        Ok(catalog)
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

/// Escape text for safe inclusion in HTML, covering the same characters as
/// the usual `&`, `<`, `>`, `"`, `'` entity set.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
