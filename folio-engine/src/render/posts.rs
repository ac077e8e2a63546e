//! Text-post sections (writer, analysis)

use super::{intro, sorted_tags, RenderContext, RenderedSection, SectionBody};
use crate::registry::{CardId, CardRole, SectionKey};
use crate::sanitize::excerpt;
use folio_common::content::{non_empty, Post};
use serde::Serialize;

/// Excerpt length on post cards
pub const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct PostsBody {
    /// Placeholder of the per-section search box
    pub search_placeholder: String,
    pub posts: Vec<PostCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub card: CardId,
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub tags: Vec<String>,
}

pub fn render(
    key: SectionKey,
    intro_text: Option<&str>,
    items: &[Post],
    ctx: &mut RenderContext<'_>,
) -> RenderedSection {
    let intro = intro(key, "Intro", intro_text, ctx);
    let chip_tags = sorted_tags(items.iter().flat_map(|p| p.tags.iter().cloned()));

    let posts = items
        .iter()
        .enumerate()
        .map(|(idx, post)| {
            let title = non_empty(&post.title).unwrap_or("");
            let card = ctx
                .registry
                .add(key, CardRole::Post { item: idx }, title, post.tags.clone(), false);
            PostCard {
                card,
                title: title.to_string(),
                date: post.date.clone().unwrap_or_default(),
                excerpt: excerpt(post.html.as_deref().unwrap_or(""), EXCERPT_CHARS),
                tags: post.tags.clone(),
            }
        })
        .collect();

    RenderedSection {
        key,
        intro,
        chip_tags,
        body: SectionBody::Posts(PostsBody {
            search_placeholder: format!("Search {}…", key),
            posts,
        }),
    }
}
