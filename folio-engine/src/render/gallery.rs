//! Gallery sections (art, photography)
//!
//! Each work with a CDN `src` becomes a thumbnail that feeds the lightbox;
//! works without one, or still pointing at Drive, become placeholders and
//! never reach the lightbox. The section's single-tag filter is restored
//! from the store before the first visibility pass.

use super::{intro, label_for, sorted_tags, RenderContext, RenderedSection, SectionBody};
use crate::lightbox::LightboxItem;
use crate::registry::{CardId, CardRole, SectionKey};
use folio_common::content::{non_empty, year_string, Work};
use serde::Serialize;
use tracing::{debug, warn};

/// `sizes` hint sent with a responsive srcset
pub const THUMB_SIZES: &str = "(min-width: 900px) 33vw, 90vw";

#[derive(Debug, Clone, Serialize)]
pub struct GalleryBody {
    /// Tag restored from the store, empty for "All"
    pub restored_tag: String,
    pub works: Vec<GalleryCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryCard {
    pub card: CardId,
    pub title: String,
    pub year: String,
    pub tags: Vec<String>,
    /// `None` renders the "needs upload" placeholder
    pub media: Option<GalleryMedia>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryMedia {
    pub src: String,
    /// `"<src> <w>w"` candidates, smallest first as authored
    pub srcset: Vec<String>,
    pub sizes: Option<&'static str>,
    /// Rendition opened in the lightbox
    pub large: String,
    pub alt: String,
    pub lightbox_index: usize,
}

pub fn render(
    key: SectionKey,
    intro_text: Option<&str>,
    works: &[Work],
    ctx: &mut RenderContext<'_>,
) -> RenderedSection {
    let intro = intro(key, "Intro", intro_text, ctx);
    let chip_tags = sorted_tags(
        works
            .iter()
            .flat_map(|w| w.tags.iter().cloned().chain(std::iter::once(year_string(&w.year)))),
    );

    let restored_tag = ctx.filters.restore_single_tag(key, ctx.store);
    if !restored_tag.is_empty() {
        debug!("Restored {} filter '{}'", key, restored_tag);
    }

    let mut cards = Vec::with_capacity(works.len());
    for (idx, work) in works.iter().enumerate() {
        let title = non_empty(&work.title).unwrap_or("");
        let year = year_string(&work.year);
        let tags: Vec<String> = work
            .tags
            .iter()
            .cloned()
            .chain(std::iter::once(year.clone()))
            .filter(|t| !t.is_empty())
            .collect();

        let src = non_empty(&work.src);
        let has_drive = non_empty(&work.drive_id).is_some();
        let label = label_for(non_empty(&work.title), "Item", idx);
        if has_drive {
            warn!(
                "[media pipeline] {} item \"{}\" requires a CDN image and removal of driveId.",
                key, label
            );
        } else if src.is_none() {
            warn!("[media pipeline] {} item \"{}\" is missing an image source.", key, label);
        }

        let media = match (has_drive, src) {
            (false, Some(src)) => Some(media_for(key, title, &year, src, work, ctx)),
            _ => None,
        };
        let card = ctx.registry.add(
            key,
            CardRole::GalleryItem { item: idx },
            title,
            tags.clone(),
            media.is_none(),
        );

        cards.push(GalleryCard {
            card,
            title: title.to_string(),
            year,
            tags,
            media,
        });
    }

    RenderedSection {
        key,
        intro,
        chip_tags,
        body: SectionBody::Gallery(GalleryBody {
            restored_tag,
            works: cards,
        }),
    }
}

/// Thumbnail markup data plus its lightbox entry
fn media_for(
    key: SectionKey,
    title: &str,
    year: &str,
    src: &str,
    work: &Work,
    ctx: &mut RenderContext<'_>,
) -> GalleryMedia {
    let candidates: Vec<(&str, u32)> = work
        .srcset
        .iter()
        .filter_map(|entry| match (non_empty(&entry.src), entry.w) {
            (Some(s), Some(w)) if w > 0 => Some((s, w)),
            _ => None,
        })
        .collect();

    let large = candidates.last().map(|(s, _)| *s).unwrap_or(src).to_string();
    let alt = format!("{} — {}", title, key);
    let filename = large.rsplit('/').next().unwrap_or("").to_string();

    let lightbox_index = ctx.lightbox_items.len();
    ctx.lightbox_items.push(LightboxItem {
        src: large.clone(),
        alt: alt.clone(),
        title: title.to_string(),
        year: year.to_string(),
        filename,
    });

    GalleryMedia {
        src: src.to_string(),
        srcset: candidates.iter().map(|(s, w)| format!("{} {}w", s, w)).collect(),
        sizes: if candidates.is_empty() { None } else { Some(THUMB_SIZES) },
        large,
        alt,
        lightbox_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterEngine;
    use crate::registry::CardRegistry;
    use folio_common::content::{SrcsetEntry, Year};
    use folio_common::storage::gallery_filter_key;
    use folio_common::{KeyValueStore, MemoryStore};

    fn works() -> Vec<Work> {
        vec![
            Work {
                title: Some("Dune".into()),
                year: Some(Year::Number(2024)),
                tags: vec!["ink".into()],
                src: Some("assets/art/dune.jpg".into()),
                srcset: vec![
                    SrcsetEntry {
                        src: Some("assets/art/dune-480.jpg".into()),
                        w: Some(480),
                    },
                    SrcsetEntry {
                        src: Some("assets/art/dune-1600.jpg".into()),
                        w: Some(1600),
                    },
                    SrcsetEntry { src: None, w: Some(900) },
                ],
                drive_id: None,
            },
            Work {
                title: Some("Lost".into()),
                ..Work::default()
            },
            Work {
                title: Some("Legacy".into()),
                src: Some("assets/art/legacy.jpg".into()),
                drive_id: Some("drive-9".into()),
                ..Work::default()
            },
        ]
    }

    #[test]
    fn test_media_and_placeholders() {
        let mut registry = CardRegistry::new();
        let mut filters = FilterEngine::new();
        let store = MemoryStore::new();
        let mut ctx = RenderContext {
            registry: &mut registry,
            filters: &mut filters,
            store: &store,
            lightbox_items: Vec::new(),
        };
        let section = render(SectionKey::Art, None, &works(), &mut ctx);
        let items = std::mem::take(&mut ctx.lightbox_items);

        assert_eq!(section.chip_tags, vec!["2024", "ink"]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].src, "assets/art/dune-1600.jpg");
        assert_eq!(items[0].filename, "dune-1600.jpg");
        assert_eq!(items[0].alt, "Dune — art");

        let SectionBody::Gallery(body) = &section.body else {
            panic!("expected gallery body");
        };
        let media = body.works[0].media.as_ref().unwrap();
        assert_eq!(
            media.srcset,
            vec!["assets/art/dune-480.jpg 480w", "assets/art/dune-1600.jpg 1600w"]
        );
        assert_eq!(media.sizes, Some(THUMB_SIZES));
        assert!(body.works[1].media.is_none());
        assert!(body.works[2].media.is_none());

        let flagged = registry.iter().filter(|c| c.needs_upload).count();
        assert_eq!(flagged, 2);
    }

    #[test]
    fn test_restores_persisted_tag() {
        let mut registry = CardRegistry::new();
        let mut filters = FilterEngine::new();
        let mut store = MemoryStore::new();
        store.set(&gallery_filter_key("photography"), "street");
        let mut ctx = RenderContext {
            registry: &mut registry,
            filters: &mut filters,
            store: &store,
            lightbox_items: Vec::new(),
        };
        let section = render(SectionKey::Photography, None, &[], &mut ctx);

        let SectionBody::Gallery(body) = &section.body else {
            panic!("expected gallery body");
        };
        assert_eq!(body.restored_tag, "street");
        assert_eq!(filters.state().single_tag(SectionKey::Photography), Some("street"));
    }
}
