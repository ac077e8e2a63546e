//! Serialisable snapshot of a session
//!
//! A pure projection of the card table, filter state and controllers. Any
//! presentation layer (or the driver's `show` command) renders from this and
//! never reaches into the controllers directly.

use crate::details::ProjectDetails;
use crate::lightbox::{LightboxItem, Zoom};
use crate::modal::{FocusTarget, ModalKind};
use crate::playlist::{LinkChoices, PlayerStatus};
use crate::registry::{CardId, CardRole, SectionKey, SectionKind};
use crate::render::{Footer, RenderedSection, SectionBody, SiteHeader, MISSING_MEDIA_LABEL};
use crate::session::Session;
use crate::theme::Theme;
use serde::Serialize;
use std::time::Instant;

/// Label of the gallery chip that clears the filter
pub const ALL_CHIP_LABEL: &str = "All";

/// Label of the chip that clears a section's tag filters
pub const CLEAR_CHIP_LABEL: &str = "Clear filters";

#[derive(Debug, Clone, Serialize)]
pub struct SessionView<'a> {
    pub header: &'a SiteHeader,
    pub footer: &'a Footer,
    pub theme: ThemeView,
    pub search: SearchView<'a>,
    pub sections: Vec<SectionView<'a>>,
    pub player: PlayerView<'a>,
    pub lightbox: Option<LightboxView<'a>>,
    pub reader: Option<ReaderView<'a>>,
    pub details: Option<DetailsView>,
    pub toast: Option<&'a str>,
    pub focus: FocusTarget,
    pub listeners: Vec<ModalKind>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeView {
    pub name: Theme,
    pub glyph: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchView<'a> {
    pub text: &'a str,
    /// Query currently applied to the cards
    pub applied: &'a str,
    pub pending: bool,
    pub clear_visible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView<'a> {
    pub key: SectionKey,
    pub chips: Vec<ChipView>,
    pub cards: Vec<CardView<'a>>,
    /// Cards passing the filters
    pub visible: usize,
    pub content: &'a RenderedSection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChipView {
    pub label: String,
    pub active: bool,
    /// Clears instead of selecting a tag
    pub clears: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardView<'a> {
    pub id: CardId,
    pub role: CardRole,
    pub title: &'a str,
    pub tags: &'a [String],
    pub visible: bool,
    /// Placeholder text when media is missing
    pub placeholder: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView<'a> {
    pub status: PlayerStatus,
    pub title: &'a str,
    pub index: usize,
    pub elapsed: String,
    pub duration: String,
    pub seek_percent: f64,
    pub volume: f64,
    pub play_glyph: &'static str,
    pub row_glyphs: Vec<&'static str>,
    pub links: LinkChoices,
}

#[derive(Debug, Clone, Serialize)]
pub struct LightboxView<'a> {
    pub index: usize,
    pub item: &'a LightboxItem,
    pub caption: String,
    pub download_name: &'a str,
    pub zoom: Zoom,
    pub zoom_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReaderView<'a> {
    pub section: Option<SectionKey>,
    pub index: usize,
    pub title: &'a str,
    pub body_html: &'a str,
    pub scroll_top: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailsView {
    pub section: Option<SectionKey>,
    pub position: usize,
    pub navigable: Vec<usize>,
    pub frozen: bool,
    pub project: Option<ProjectDetails>,
}

impl Session {
    /// Project the whole session at `now`
    pub fn view(&self, now: Instant) -> SessionView<'_> {
        SessionView {
            header: &self.page.header,
            footer: &self.page.footer,
            theme: ThemeView {
                name: self.theme,
                glyph: self.theme.glyph(),
            },
            search: SearchView {
                text: &self.search_text,
                applied: &self.filters.state().query,
                pending: self.search.is_pending(),
                clear_visible: !self.search_text.is_empty(),
            },
            sections: self.page.sections.iter().map(|s| self.section_view(s)).collect(),
            player: self.player_view(),
            lightbox: self.lightbox_view(),
            reader: self.reader_view(),
            details: self.details_view(),
            toast: self.toast.visible(now),
            focus: self.router.focus(),
            listeners: self.router.listeners(),
        }
    }

    /// Chips of one section with their active state
    pub fn chips(&self, section: SectionKey) -> Vec<ChipView> {
        let Some(rendered) = self.page.section(section) else {
            return Vec::new();
        };
        let state = self.filters.state();
        let tag_chip = |tag: &String, active: bool| ChipView {
            label: tag.clone(),
            active,
            clears: false,
        };

        match section.kind() {
            SectionKind::Contact => Vec::new(),
            SectionKind::Gallery => {
                let active = state.single_tag(section);
                std::iter::once(ChipView {
                    label: ALL_CHIP_LABEL.to_string(),
                    active: active.is_none(),
                    clears: true,
                })
                .chain(
                    rendered
                        .chip_tags
                        .iter()
                        .map(|t| tag_chip(t, active == Some(t.as_str()))),
                )
                .collect()
            }
            SectionKind::Projects => {
                let selected = state.multi_tags(section);
                std::iter::once(ChipView {
                    label: CLEAR_CHIP_LABEL.to_string(),
                    active: false,
                    clears: true,
                })
                .chain(rendered.chip_tags.iter().map(|t| {
                    tag_chip(t, selected.is_some_and(|set| set.contains(t)))
                }))
                .collect()
            }
            SectionKind::Playlist | SectionKind::Posts => {
                let active = state.single_tag(section);
                let clear = active.map(|_| ChipView {
                    label: CLEAR_CHIP_LABEL.to_string(),
                    active: true,
                    clears: true,
                });
                clear
                    .into_iter()
                    .chain(
                        rendered
                            .chip_tags
                            .iter()
                            .map(|t| tag_chip(t, active == Some(t.as_str()))),
                    )
                    .collect()
            }
        }
    }

    fn section_view<'a>(&'a self, rendered: &'a RenderedSection) -> SectionView<'a> {
        let cards: Vec<CardView<'a>> = self
            .registry
            .section(rendered.key)
            .map(|card| CardView {
                id: card.id,
                role: card.role,
                title: &card.title,
                tags: &card.tags,
                visible: card.visible,
                placeholder: card.needs_upload.then(|| placeholder_for(&rendered.body)),
            })
            .collect();
        SectionView {
            key: rendered.key,
            chips: self.chips(rendered.key),
            visible: cards.iter().filter(|c| c.visible).count(),
            cards,
            content: rendered,
        }
    }

    fn player_view(&self) -> PlayerView<'_> {
        let p = &self.playlist;
        PlayerView {
            status: p.status(),
            title: p.title(),
            index: p.index(),
            elapsed: p.elapsed_label(),
            duration: p.duration_label(),
            seek_percent: p.seek_percent(),
            volume: p.audio().volume(),
            play_glyph: p.play_glyph(),
            row_glyphs: p.row_glyphs(),
            links: p.link_choices(),
        }
    }

    fn lightbox_view(&self) -> Option<LightboxView<'_>> {
        if !self.lightbox.is_open() {
            return None;
        }
        let item = self.lightbox.current()?;
        Some(LightboxView {
            index: self.lightbox.index(),
            caption: item.caption(),
            download_name: item.download_name(),
            item,
            zoom: self.lightbox.zoom(),
            zoom_label: self.lightbox.zoom().button_label(),
        })
    }

    fn reader_view(&self) -> Option<ReaderView<'_>> {
        if !self.reader.is_open() {
            return None;
        }
        Some(ReaderView {
            section: self.reader.section(),
            index: self.reader.index(),
            title: self.reader.title(),
            body_html: self.reader.body_html(),
            scroll_top: self.reader.scroll_top(),
        })
    }

    fn details_view(&self) -> Option<DetailsView> {
        if !self.details.is_open() {
            return None;
        }
        Some(DetailsView {
            section: self.details.section(),
            position: self.details.position(),
            navigable: self.details.visible_list().to_vec(),
            frozen: self.details.is_frozen(),
            project: self.details.details(),
        })
    }
}

fn placeholder_for(body: &SectionBody) -> &'static str {
    match body {
        SectionBody::Projects(_) => crate::render::projects::REPLACE_EMBED_LABEL,
        _ => MISSING_MEDIA_LABEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionOptions;
    use folio_common::content::ContentDocument;
    use folio_common::MemoryStore;

    fn session() -> Session {
        let doc = ContentDocument::from_json(
            r#"{
                "writer": {"posts": [{"title": "A", "tags": ["x", "y"]}]},
                "art": {"works": [{"title": "Dune", "src": "d.jpg", "tags": ["ink"], "year": 2024}]},
                "apps": {"projects": [{"title": "Tool", "tags": ["cli"]}]}
            }"#,
        )
        .unwrap();
        Session::new(doc, MemoryStore::new(), SessionOptions::default())
    }

    fn labels(chips: &[ChipView]) -> Vec<(&str, bool)> {
        chips.iter().map(|c| (c.label.as_str(), c.active)).collect()
    }

    #[test]
    fn test_gallery_chips_lead_with_all() {
        let mut s = session();
        assert_eq!(
            labels(&s.chips(SectionKey::Art)),
            vec![("All", true), ("2024", false), ("ink", false)]
        );
        s.select_tag(SectionKey::Art, "ink");
        assert_eq!(
            labels(&s.chips(SectionKey::Art)),
            vec![("All", false), ("2024", false), ("ink", true)]
        );
    }

    #[test]
    fn test_post_chips_show_clear_only_when_active() {
        let mut s = session();
        assert_eq!(labels(&s.chips(SectionKey::Writer)), vec![("x", false), ("y", false)]);
        s.select_tag(SectionKey::Writer, "y");
        assert_eq!(
            labels(&s.chips(SectionKey::Writer)),
            vec![("Clear filters", true), ("x", false), ("y", true)]
        );
        s.clear_filters(SectionKey::Writer);
        assert_eq!(labels(&s.chips(SectionKey::Writer)), vec![("x", false), ("y", false)]);
    }

    #[test]
    fn test_project_chips_always_offer_clear() {
        let mut s = session();
        s.select_tag(SectionKey::Apps, "cli");
        assert_eq!(
            labels(&s.chips(SectionKey::Apps)),
            vec![("Clear filters", false), ("cli", true)]
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let s = session();
        let json = serde_json::to_value(s.view(Instant::now())).unwrap();
        assert_eq!(json["header"]["name"], "YOUR NAME");
        assert_eq!(json["theme"]["name"], "light");
        assert_eq!(json["sections"].as_array().unwrap().len(), 8);
        assert!(json["lightbox"].is_null());
        assert_eq!(json["player"]["status"], "idle");
    }
}
