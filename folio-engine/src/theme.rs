//! Light/dark theme

use folio_common::storage::{KeyValueStore, THEME_KEY};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Stored choice, else the system preference
    ///
    /// Any stored value other than `dark` means light.
    pub fn resolve(store: &dyn KeyValueStore, prefers_dark: bool) -> Self {
        match store.get(THEME_KEY) {
            Some(value) if !value.is_empty() => Self::from_stored(&value),
            _ if prefers_dark => Theme::Dark,
            _ => Theme::Light,
        }
    }

    fn from_stored(value: &str) -> Self {
        if value == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Toggle button glyph
    pub fn glyph(&self) -> &'static str {
        match self {
            Theme::Light => "☀️",
            Theme::Dark => "🌙",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Persist the choice
    pub fn apply(self, store: &mut dyn KeyValueStore) {
        store.set(THEME_KEY, self.as_str());
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_common::MemoryStore;

    #[test]
    fn test_resolve_prefers_stored_value() {
        let mut store = MemoryStore::new();
        assert_eq!(Theme::resolve(&store, true), Theme::Dark);
        assert_eq!(Theme::resolve(&store, false), Theme::Light);

        store.set(THEME_KEY, "light");
        assert_eq!(Theme::resolve(&store, true), Theme::Light);
        store.set(THEME_KEY, "sepia");
        assert_eq!(Theme::resolve(&store, true), Theme::Light);
        store.set(THEME_KEY, "dark");
        assert_eq!(Theme::resolve(&store, false), Theme::Dark);
    }

    #[test]
    fn test_toggle_persists() {
        let mut store = MemoryStore::new();
        let theme = Theme::resolve(&store, false).toggled();
        theme.apply(&mut store);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(theme.glyph(), "🌙");
    }
}
