//! Filter engine
//!
//! Four independent pieces of state converge on one visibility pass:
//! the global query, a per-section query, a single active tag per section,
//! and a set of OR-combined tags per section. Every mutation re-evaluates
//! every card; card counts are in the tens, so there is no index.
//!
//! A card is visible iff all four predicates hold:
//! - global query empty, or title/tags contain it
//! - section query empty, or title/tags contain it
//! - single tag empty, or the card carries it (exact, case-sensitive)
//! - multi-tag set empty, or it intersects the card's tags

use crate::registry::{Card, CardRegistry, SectionKey, SectionKind};
use folio_common::storage::{
    gallery_filter_key, get_json, multi_filter_key, set_json, KeyValueStore,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Process-wide filter state, keyed by section
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterState {
    /// Global free text, lowercased and trimmed
    pub query: String,
    /// Per-section free text, lowercased and trimmed
    pub section_query: HashMap<SectionKey, String>,
    /// At most one active tag per section; empty means inactive
    pub single_tag: HashMap<SectionKey, String>,
    /// Zero or more active tags per section
    pub multi_tag: HashMap<SectionKey, BTreeSet<String>>,
}

impl FilterState {
    /// Active single tag for a section, if any
    pub fn single_tag(&self, section: SectionKey) -> Option<&str> {
        self.single_tag
            .get(&section)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    /// Active multi tags for a section (possibly empty)
    pub fn multi_tags(&self, section: SectionKey) -> Option<&BTreeSet<String>> {
        self.multi_tag.get(&section).filter(|set| !set.is_empty())
    }

    /// Whether one card passes all four predicates
    pub fn admits(&self, card: &Card) -> bool {
        let section_query = self
            .section_query
            .get(&card.section)
            .map(String::as_str)
            .unwrap_or("");

        let query_ok = self.query.is_empty() || card.matches_text(&self.query);
        let section_query_ok = section_query.is_empty() || card.matches_text(section_query);
        let tag_ok = match self.single_tag(card.section) {
            Some(tag) => card.tags.iter().any(|t| t == tag),
            None => true,
        };
        let multi_ok = match self.multi_tags(card.section) {
            Some(set) => card.tags.iter().any(|t| set.contains(t)),
            None => true,
        };

        query_ok && section_query_ok && tag_ok && multi_ok
    }
}

/// Normalize free text the way the search boxes do
pub fn normalize_query(raw: &str) -> String {
    raw.to_lowercase().trim().to_string()
}

/// Owns [`FilterState`] and applies it to the registry
#[derive(Debug, Default)]
pub struct FilterEngine {
    state: FilterState,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Set the global query and recompute
    pub fn set_query(&mut self, raw: &str, registry: &mut CardRegistry) {
        self.state.query = normalize_query(raw);
        self.recompute(registry);
    }

    /// Set one section's query and recompute
    pub fn set_section_query(&mut self, section: SectionKey, raw: &str, registry: &mut CardRegistry) {
        self.state.section_query.insert(section, normalize_query(raw));
        self.recompute(registry);
    }

    /// Set (or clear with "") one section's single-tag filter and recompute
    ///
    /// Gallery sections persist the choice.
    pub fn set_single_tag(
        &mut self,
        section: SectionKey,
        tag: &str,
        registry: &mut CardRegistry,
        store: &mut dyn KeyValueStore,
    ) {
        self.state.single_tag.insert(section, tag.to_string());
        if section.kind() == SectionKind::Gallery {
            store.set(&gallery_filter_key(section.as_str()), tag);
        }
        self.recompute(registry);
    }

    /// Add or remove one tag from a section's multi-tag set and recompute
    ///
    /// Project sections persist the set as a JSON array.
    pub fn toggle_multi_tag(
        &mut self,
        section: SectionKey,
        tag: &str,
        registry: &mut CardRegistry,
        store: &mut dyn KeyValueStore,
    ) {
        let set = self.state.multi_tag.entry(section).or_default();
        if !set.remove(tag) {
            set.insert(tag.to_string());
        }
        self.persist_multi(section, store);
        self.recompute(registry);
    }

    /// Drop every section-scoped filter for one section and recompute
    pub fn clear_section(
        &mut self,
        section: SectionKey,
        registry: &mut CardRegistry,
        store: &mut dyn KeyValueStore,
    ) {
        self.state.section_query.remove(&section);
        self.state.single_tag.insert(section, String::new());
        self.state.multi_tag.insert(section, BTreeSet::new());

        match section.kind() {
            SectionKind::Gallery => store.set(&gallery_filter_key(section.as_str()), ""),
            SectionKind::Projects => self.persist_multi(section, store),
            _ => {}
        }
        self.recompute(registry);
    }

    /// Load a gallery's persisted single tag without recomputing
    pub(crate) fn restore_single_tag(&mut self, section: SectionKey, store: &dyn KeyValueStore) -> String {
        let saved = store
            .get(&gallery_filter_key(section.as_str()))
            .unwrap_or_default();
        self.state.single_tag.insert(section, saved.clone());
        saved
    }

    /// Load a project list's persisted multi tags without recomputing
    pub(crate) fn restore_multi_tags(
        &mut self,
        section: SectionKey,
        store: &dyn KeyValueStore,
    ) -> BTreeSet<String> {
        let saved: Vec<String> = get_json(store, &multi_filter_key(section.as_str())).unwrap_or_default();
        let set: BTreeSet<String> = saved.into_iter().collect();
        self.state.multi_tag.insert(section, set.clone());
        set
    }

    /// Re-evaluate every card
    pub fn recompute(&self, registry: &mut CardRegistry) {
        let mut shown = 0usize;
        for card in registry.iter_mut() {
            card.visible = self.state.admits(card);
            if card.visible {
                shown += 1;
            }
        }
        debug!("Filter pass: {}/{} cards visible", shown, registry.len());
    }

    fn persist_multi(&self, section: SectionKey, store: &mut dyn KeyValueStore) {
        if section.kind() != SectionKind::Projects {
            return;
        }
        let tags: Vec<&String> = self
            .state
            .multi_tag
            .get(&section)
            .map(|set| set.iter().collect())
            .unwrap_or_default();
        set_json(store, &multi_filter_key(section.as_str()), &tags);
    }
}
