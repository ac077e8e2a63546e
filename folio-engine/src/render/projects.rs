//! Project-list sections (games, apps)
//!
//! Cards carry multi-select tag chips and open the details carousel.
//! A project whose embed still points at Drive is flagged "needs upload"
//! and offers a disabled replacement action; it stays navigable.

use super::{intro, label_for, sorted_tags, LinkView, RenderContext, RenderedSection, SectionBody};
use crate::registry::{CardId, CardRole, SectionKey};
use folio_common::content::{non_empty, year_string, Embed, ProjectList};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

/// Label of the disabled action on Drive-embedded projects
pub const REPLACE_EMBED_LABEL: &str = "Replace with YouTube/Vimeo";

const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed";
const VIMEO_EMBED_BASE: &str = "https://player.vimeo.com/video";
const CFSTREAM_EMBED_BASE: &str = "https://iframe.videodelivery.net";

const FULL_PLAYER_PERMISSIONS: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture";
const VIMEO_PERMISSIONS: &str = "autoplay; fullscreen; picture-in-picture";

#[derive(Debug, Clone, Serialize)]
pub struct ProjectsBody {
    /// Tags restored from the store
    pub restored_tags: Vec<String>,
    pub projects: Vec<ProjectCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectCard {
    pub card: CardId,
    /// Index in the section's project list
    pub item: usize,
    pub title: String,
    pub year: String,
    pub tags: Vec<String>,
    pub thumb: String,
    pub alt: String,
    pub links: Vec<LinkView>,
    pub needs_upload: bool,
    /// Disabled action shown on Drive-embedded projects
    pub disabled_action: Option<&'static str>,
}

/// Player shown at the top of the details modal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmbedView {
    Frame {
        src: String,
        title: String,
        allow: &'static str,
    },
    Placeholder {
        message: &'static str,
    },
}

pub fn render(key: SectionKey, list: &ProjectList, ctx: &mut RenderContext<'_>) -> RenderedSection {
    let intro = intro(key, "Intro", non_empty(&list.intro), ctx);
    let chip_tags = sorted_tags(
        list.projects
            .iter()
            .flat_map(|p| p.tags.iter().cloned().chain(std::iter::once(year_string(&p.year)))),
    );

    let restored_tags: Vec<String> = ctx
        .filters
        .restore_multi_tags(key, ctx.store)
        .into_iter()
        .collect();
    if !restored_tags.is_empty() {
        debug!("Restored {} filters {:?}", key, restored_tags);
    }

    let mut projects = Vec::with_capacity(list.projects.len());
    for (idx, project) in list.projects.iter().enumerate() {
        let title = non_empty(&project.title).unwrap_or("");
        let year = year_string(&project.year);
        let tags: Vec<String> = project
            .tags
            .iter()
            .cloned()
            .chain(std::iter::once(year.clone()))
            .filter(|t| !t.is_empty())
            .collect();

        let needs_upload = project.embed.as_ref().is_some_and(Embed::is_drive);
        if needs_upload {
            warn!(
                "[media pipeline] {} project \"{}\" requires a YouTube or Vimeo embed.",
                key,
                label_for(non_empty(&project.title), "Project", idx)
            );
        }

        let card = ctx.registry.add(
            key,
            CardRole::Project { item: idx },
            title,
            tags.clone(),
            needs_upload,
        );

        projects.push(ProjectCard {
            card,
            item: idx,
            title: title.to_string(),
            year,
            tags,
            thumb: project.thumb.clone().unwrap_or_default(),
            alt: format!("{} — {}", title, key),
            links: project.links.iter().map(LinkView::from).collect(),
            needs_upload,
            disabled_action: needs_upload.then_some(REPLACE_EMBED_LABEL),
        });
    }

    RenderedSection {
        key,
        intro,
        chip_tags,
        body: SectionBody::Projects(ProjectsBody {
            restored_tags,
            projects,
        }),
    }
}

/// Player for a project's embed, if it has a usable one
pub fn embed_view(embed: &Embed, title: &str) -> Option<EmbedView> {
    let id = non_empty(&embed.id);
    let frame = |src: String, fallback: &str, allow: &'static str| EmbedView::Frame {
        src,
        title: if title.is_empty() { fallback.to_string() } else { title.to_string() },
        allow,
    };

    match embed.kind.as_deref()? {
        "youtube" => {
            let src = frame_url(YOUTUBE_EMBED_BASE, id?)?;
            Some(frame(src, "YouTube video", FULL_PLAYER_PERMISSIONS))
        }
        "vimeo" => {
            let src = frame_url(VIMEO_EMBED_BASE, id?)?;
            Some(frame(src, "Vimeo video", VIMEO_PERMISSIONS))
        }
        "cfstream" => {
            let src = match non_empty(&embed.url) {
                Some(url) => url.to_string(),
                None => frame_url(CFSTREAM_EMBED_BASE, id.unwrap_or(""))?,
            };
            Some(frame(src, "Cloudflare Stream", FULL_PLAYER_PERMISSIONS))
        }
        "gdrive" => Some(EmbedView::Placeholder {
            message: REPLACE_EMBED_LABEL,
        }),
        _ => None,
    }
}

/// Append `id` as one percent-encoded path segment
fn frame_url(base: &str, id: &str) -> Option<String> {
    let mut url = Url::parse(base).ok()?;
    url.path_segments_mut().ok()?.push(id);
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterEngine;
    use crate::registry::CardRegistry;
    use folio_common::content::{Project, Year};
    use folio_common::storage::multi_filter_key;
    use folio_common::{KeyValueStore, MemoryStore};

    fn embed(kind: &str, id: Option<&str>, url: Option<&str>) -> Embed {
        Embed {
            kind: Some(kind.to_string()),
            id: id.map(String::from),
            url: url.map(String::from),
        }
    }

    #[test]
    fn test_embed_urls() {
        let yt = embed_view(&embed("youtube", Some("abc123"), None), "Trailer").unwrap();
        assert_eq!(
            yt,
            EmbedView::Frame {
                src: "https://www.youtube.com/embed/abc123".into(),
                title: "Trailer".into(),
                allow: FULL_PLAYER_PERMISSIONS,
            }
        );

        let vimeo = embed_view(&embed("vimeo", Some("42"), None), "").unwrap();
        let EmbedView::Frame { src, title, .. } = vimeo else {
            panic!("expected frame");
        };
        assert_eq!(src, "https://player.vimeo.com/video/42");
        assert_eq!(title, "Vimeo video");

        let cf = embed_view(&embed("cfstream", Some("vid"), None), "x").unwrap();
        assert!(matches!(cf, EmbedView::Frame { ref src, .. } if src == "https://iframe.videodelivery.net/vid"));
        let cf_url = embed_view(
            &embed("cfstream", None, Some("https://customer.example/watch")),
            "x",
        )
        .unwrap();
        assert!(matches!(cf_url, EmbedView::Frame { ref src, .. } if src == "https://customer.example/watch"));
    }

    #[test]
    fn test_embed_ids_are_encoded() {
        let yt = embed_view(&embed("youtube", Some("a b/c"), None), "t").unwrap();
        assert!(matches!(yt, EmbedView::Frame { ref src, .. } if src == "https://www.youtube.com/embed/a%20b%2Fc"));
    }

    #[test]
    fn test_unusable_embeds() {
        assert_eq!(embed_view(&embed("youtube", None, None), "t"), None);
        assert_eq!(embed_view(&embed("flash", Some("x"), None), "t"), None);
        assert_eq!(
            embed_view(&embed("gdrive", Some("x"), None), "t"),
            Some(EmbedView::Placeholder {
                message: REPLACE_EMBED_LABEL
            })
        );
    }

    #[test]
    fn test_drive_projects_flagged_and_filters_restored() {
        let list = ProjectList {
            intro: Some("Things I made".into()),
            projects: vec![
                Project {
                    title: Some("Old".into()),
                    year: Some(Year::Number(2022)),
                    embed: Some(embed("gdrive", Some("d"), None)),
                    ..Project::default()
                },
                Project {
                    title: Some("New".into()),
                    year: Some(Year::Number(2023)),
                    tags: vec!["demo".into()],
                    ..Project::default()
                },
            ],
        };
        let mut registry = CardRegistry::new();
        let mut filters = FilterEngine::new();
        let mut store = MemoryStore::new();
        store.set(&multi_filter_key("games"), r#"["2023"]"#);
        let mut ctx = RenderContext {
            registry: &mut registry,
            filters: &mut filters,
            store: &store,
            lightbox_items: Vec::new(),
        };

        let section = render(SectionKey::Games, &list, &mut ctx);
        assert_eq!(section.chip_tags, vec!["2022", "2023", "demo"]);
        let SectionBody::Projects(body) = &section.body else {
            panic!("expected projects body");
        };
        assert_eq!(body.restored_tags, vec!["2023"]);
        assert!(body.projects[0].needs_upload);
        assert_eq!(body.projects[0].disabled_action, Some(REPLACE_EMBED_LABEL));
        assert_eq!(body.projects[1].disabled_action, None);
        assert_eq!(body.projects[1].alt, "New — games");
        assert_eq!(registry.len(), 3);
    }
}
