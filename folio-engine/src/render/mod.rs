//! Section renderers
//!
//! One handler per [`SectionKind`]. Each turns its slice of the content
//! document into registered cards, the sorted chip tags for the section and a
//! serialisable body describing the section's own controls. Rendering runs
//! once per session; afterwards only card visibility changes.
//!
//! Incomplete content never fails here. Items with missing or unmigrated
//! media render as "needs upload" cards and are logged for the media
//! pipeline.

pub mod contact;
pub mod gallery;
pub mod musician;
pub mod posts;
pub mod projects;
pub mod site;

use crate::filter::FilterEngine;
use crate::lightbox::LightboxItem;
use crate::registry::{CardId, CardRegistry, CardRole, SectionKey, SectionKind};
use folio_common::content::{non_empty, ContentDocument, Link, Post, Work};
use folio_common::KeyValueStore;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

pub use contact::ContactBody;
pub use gallery::{GalleryBody, GalleryCard, GalleryMedia};
pub use musician::{PlaylistBody, TrackRow};
pub use posts::{PostCard, PostsBody};
pub use projects::{embed_view, EmbedView, ProjectCard, ProjectsBody};
pub use site::{Footer, SiteHeader};

/// Text shown on a "needs upload" placeholder
pub const MISSING_MEDIA_LABEL: &str = "MISSING: upload to CDN";

/// Mutable state the renderers write into
pub struct RenderContext<'a> {
    pub registry: &'a mut CardRegistry,
    pub filters: &'a mut FilterEngine,
    pub store: &'a dyn KeyValueStore,
    /// Gallery images in page order
    pub lightbox_items: Vec<LightboxItem>,
}

/// A labelled link as rendered on buttons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkView {
    pub label: String,
    pub url: String,
}

impl From<&Link> for LinkView {
    fn from(link: &Link) -> Self {
        Self {
            label: link.display_label().to_string(),
            url: link.href().to_string(),
        }
    }
}

/// Intro or bio block at the top of a section
#[derive(Debug, Clone, Serialize)]
pub struct Intro {
    pub card: CardId,
    pub text: String,
}

/// Section-specific content, dispatched on [`SectionKind`]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBody {
    Playlist(PlaylistBody),
    Posts(PostsBody),
    Gallery(GalleryBody),
    Projects(ProjectsBody),
    Contact(ContactBody),
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedSection {
    pub key: SectionKey,
    pub intro: Option<Intro>,
    /// Unique tags, sorted ascending
    pub chip_tags: Vec<String>,
    pub body: SectionBody,
}

/// Everything rendered from one content document
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    pub header: SiteHeader,
    pub footer: Footer,
    pub sections: Vec<RenderedSection>,
    pub lightbox_items: Vec<LightboxItem>,
}

impl RenderedPage {
    pub fn section(&self, key: SectionKey) -> Option<&RenderedSection> {
        self.sections.iter().find(|s| s.key == key)
    }
}

/// Render every section in page order, restore persisted filters and run
/// the first visibility pass
pub fn render_document(
    doc: &ContentDocument,
    registry: &mut CardRegistry,
    filters: &mut FilterEngine,
    store: &dyn KeyValueStore,
    footer_year: i32,
) -> RenderedPage {
    let mut ctx = RenderContext {
        registry,
        filters,
        store,
        lightbox_items: Vec::new(),
    };

    let mut sections = Vec::with_capacity(SectionKey::ALL.len());
    for key in SectionKey::ALL {
        let section = match key.kind() {
            SectionKind::Playlist => musician::render(&doc.musician, &mut ctx),
            SectionKind::Posts => {
                let (intro, items) = posts_of(doc, key);
                posts::render(key, intro, items, &mut ctx)
            }
            SectionKind::Gallery => {
                let (intro, works) = works_of(doc, key);
                gallery::render(key, intro, works, &mut ctx)
            }
            SectionKind::Projects => {
                let list = if key == SectionKey::Games { &doc.games } else { &doc.apps };
                projects::render(key, list, &mut ctx)
            }
            SectionKind::Contact => contact::render(&doc.contact, &mut ctx),
        };
        sections.push(section);
    }

    let RenderContext {
        registry,
        filters,
        lightbox_items,
        ..
    } = ctx;
    filters.recompute(registry);
    info!(
        "Rendered {} cards across {} sections ({} lightbox images)",
        registry.len(),
        sections.len(),
        lightbox_items.len()
    );

    RenderedPage {
        header: site::header(&doc.site),
        footer: site::footer(&doc.site, &doc.contact, footer_year),
        sections,
        lightbox_items,
    }
}

/// Intro text and posts of a text-post section
pub fn posts_of(doc: &ContentDocument, key: SectionKey) -> (Option<&str>, &[Post]) {
    match key {
        SectionKey::Writer => (non_empty(&doc.writer.intro), &doc.writer.posts),
        SectionKey::Analysis => (non_empty(&doc.analysis.intro), &doc.analysis.essays),
        _ => (None, &[]),
    }
}

/// Intro text and works of a gallery section
pub fn works_of(doc: &ContentDocument, key: SectionKey) -> (Option<&str>, &[Work]) {
    match key {
        SectionKey::Art => (non_empty(&doc.art.intro), &doc.art.works),
        SectionKey::Photography => (non_empty(&doc.photography.intro), &doc.photography.photos),
        _ => (None, &[]),
    }
}

/// Sorted, deduplicated, non-empty tags
pub fn sorted_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    tags.into_iter()
        .filter(|t| !t.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Register an intro card when there is intro text
fn intro(
    key: SectionKey,
    title: &str,
    text: Option<&str>,
    ctx: &mut RenderContext<'_>,
) -> Option<Intro> {
    let text = text?;
    let card = ctx.registry.add(key, CardRole::Intro, title, Vec::new(), false);
    Some(Intro {
        card,
        text: text.to_string(),
    })
}

/// Title, or "<fallback> <n>" for log lines
fn label_for(title: Option<&str>, fallback: &str, index: usize) -> String {
    match title {
        Some(t) => t.to_string(),
        None => format!("{} {}", fallback, index + 1),
    }
}
