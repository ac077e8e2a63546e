//! Card registry
//!
//! Every renderable item becomes one entry in a flat table. Cards are only
//! ever appended (sections render once, at startup) and the filter engine
//! flips their visibility flag in place. Presentation layers read the table;
//! they never own it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level content category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKey {
    Musician,
    Writer,
    Analysis,
    Art,
    Games,
    Photography,
    Apps,
    Contact,
}

/// How a section is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Bio, audio player and track list
    Playlist,
    /// Rich-text posts opened in the reader
    Posts,
    /// Image grid feeding the lightbox
    Gallery,
    /// Project cards with multi-tag chips and the details carousel
    Projects,
    /// Email and links
    Contact,
}

impl SectionKey {
    /// All sections in page order
    pub const ALL: [SectionKey; 8] = [
        SectionKey::Musician,
        SectionKey::Writer,
        SectionKey::Analysis,
        SectionKey::Art,
        SectionKey::Games,
        SectionKey::Photography,
        SectionKey::Apps,
        SectionKey::Contact,
    ];

    /// Key as it appears in the document and in persisted keys
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Musician => "musician",
            SectionKey::Writer => "writer",
            SectionKey::Analysis => "analysis",
            SectionKey::Art => "art",
            SectionKey::Games => "games",
            SectionKey::Photography => "photography",
            SectionKey::Apps => "apps",
            SectionKey::Contact => "contact",
        }
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            SectionKey::Musician => SectionKind::Playlist,
            SectionKey::Writer | SectionKey::Analysis => SectionKind::Posts,
            SectionKey::Art | SectionKey::Photography => SectionKind::Gallery,
            SectionKey::Games | SectionKey::Apps => SectionKind::Projects,
            SectionKey::Contact => SectionKind::Contact,
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown section '{}'", s))
    }
}

/// Opaque handle to a registered card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CardId(usize);

impl CardId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What a card stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardRole {
    /// Section intro or bio text
    Intro,
    /// Track at `item` in the document's track list
    Track { item: usize },
    /// Post at `item` in the section's post list
    Post { item: usize },
    /// Gallery work at `item` in the section's work list
    GalleryItem { item: usize },
    /// Project at `item` in the section's project list
    Project { item: usize },
    /// Contact block
    Contact,
}

impl CardRole {
    /// Index of the backing item in its section list, if any
    pub fn item_index(&self) -> Option<usize> {
        match self {
            CardRole::Track { item }
            | CardRole::Post { item }
            | CardRole::GalleryItem { item }
            | CardRole::Project { item } => Some(*item),
            CardRole::Intro | CardRole::Contact => None,
        }
    }
}

/// One renderable unit known to the filter engine
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub id: CardId,
    pub section: SectionKey,
    pub role: CardRole,
    pub title: String,
    /// Tags flattened to strings at creation
    pub tags: Vec<String>,
    /// Media is missing or unmigrated; shown as a disabled placeholder
    pub needs_upload: bool,
    /// Last result of the filter pass
    pub visible: bool,
    /// Lowercased `title + " " + tags`, built once
    #[serde(skip)]
    search_text: String,
}

impl Card {
    /// Free-text match against title and tags
    ///
    /// `query` must already be lowercased and trimmed.
    pub fn matches_text(&self, query: &str) -> bool {
        self.search_text.contains(query)
    }
}

/// Flat, append-only table of cards
#[derive(Debug, Default)]
pub struct CardRegistry {
    cards: Vec<Card>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card; it starts visible
    pub fn add(
        &mut self,
        section: SectionKey,
        role: CardRole,
        title: &str,
        tags: Vec<String>,
        needs_upload: bool,
    ) -> CardId {
        let id = CardId(self.cards.len());
        let search_text = format!("{} {}", title.to_lowercase(), tags.join(" ").to_lowercase())
            .trim()
            .to_string();
        self.cards.push(Card {
            id,
            section,
            role,
            title: title.to_string(),
            tags,
            needs_upload,
            visible: true,
            search_text,
        });
        id
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All cards in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Card> {
        self.cards.iter_mut()
    }

    /// Cards of one section in registration order
    pub fn section(&self, section: SectionKey) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(move |c| c.section == section)
    }

    /// Item indices of a section's project cards that currently pass the filters
    pub fn visible_project_items(&self, section: SectionKey) -> Vec<usize> {
        self.section(section)
            .filter(|c| c.visible)
            .filter_map(|c| match c.role {
                CardRole::Project { item } => Some(item),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_key_round_trip_names() {
        for key in SectionKey::ALL {
            assert_eq!(key.as_str().parse::<SectionKey>().unwrap(), key);
        }
        assert!("blog".parse::<SectionKey>().is_err());
    }

    #[test]
    fn test_section_kinds() {
        assert_eq!(SectionKey::Musician.kind(), SectionKind::Playlist);
        assert_eq!(SectionKey::Analysis.kind(), SectionKind::Posts);
        assert_eq!(SectionKey::Photography.kind(), SectionKind::Gallery);
        assert_eq!(SectionKey::Apps.kind(), SectionKind::Projects);
    }

    #[test]
    fn test_search_text_is_lowercased() {
        let mut registry = CardRegistry::new();
        let id = registry.add(
            SectionKey::Writer,
            CardRole::Post { item: 0 },
            "Level Design NOTES",
            vec!["Essay".into()],
            false,
        );
        let card = registry.get(id).unwrap();
        assert!(card.matches_text("design notes"));
        assert!(card.matches_text("essay"));
        assert!(!card.matches_text("Essay"));
    }

    #[test]
    fn test_visible_project_items_skips_intro_and_hidden() {
        let mut registry = CardRegistry::new();
        registry.add(SectionKey::Games, CardRole::Intro, "Intro", vec![], false);
        registry.add(SectionKey::Games, CardRole::Project { item: 0 }, "A", vec![], false);
        let hidden = registry.add(SectionKey::Games, CardRole::Project { item: 1 }, "B", vec![], false);
        registry.add(SectionKey::Games, CardRole::Project { item: 2 }, "C", vec![], false);
        registry.add(SectionKey::Apps, CardRole::Project { item: 0 }, "X", vec![], false);

        registry.iter_mut().find(|c| c.id == hidden).unwrap().visible = false;

        assert_eq!(registry.visible_project_items(SectionKey::Games), vec![0, 2]);
    }
}
