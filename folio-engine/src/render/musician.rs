//! Musician section: bio, track rows and year chips

use super::{label_for, sorted_tags, Intro, LinkView, RenderContext, RenderedSection, SectionBody};
use crate::registry::{CardId, CardRole, SectionKey};
use folio_common::content::{non_empty, year_string, Musician};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistBody {
    pub rows: Vec<TrackRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackRow {
    pub card: CardId,
    pub title: String,
    pub year: String,
    pub links: Vec<LinkView>,
    pub needs_upload: bool,
    /// Position in the playlist; `None` for placeholder rows
    pub playable: Option<usize>,
}

pub fn render(musician: &Musician, ctx: &mut RenderContext<'_>) -> RenderedSection {
    let key = SectionKey::Musician;
    let bio = non_empty(&musician.bio).unwrap_or("").to_string();
    let bio_card = ctx.registry.add(key, CardRole::Intro, "Musician", Vec::new(), false);

    let chip_tags = sorted_tags(musician.tracks.iter().map(|t| year_string(&t.year)));

    let mut rows = Vec::with_capacity(musician.tracks.len());
    let mut next_playable = 0usize;
    for (idx, track) in musician.tracks.iter().enumerate() {
        let title = non_empty(&track.title).unwrap_or("");
        let year = year_string(&track.year);
        let tags: Vec<String> = std::iter::once(year.clone())
            .chain(track.links.iter().map(|l| l.label.clone().unwrap_or_default()))
            .filter(|t| !t.is_empty())
            .collect();

        let has_drive = non_empty(&track.drive_id).is_some();
        let has_file = non_empty(&track.file).is_some();
        let needs_upload = has_drive || !has_file;
        let label = label_for(non_empty(&track.title), "Track", idx);
        if has_drive {
            warn!(
                "[media pipeline] Music track \"{}\" requires a CDN file and removal of driveId.",
                label
            );
        } else if !has_file {
            warn!("[media pipeline] Music track \"{}\" is missing an audio file path.", label);
        }

        let card = ctx
            .registry
            .add(key, CardRole::Track { item: idx }, title, tags, needs_upload);
        let playable = if needs_upload {
            None
        } else {
            next_playable += 1;
            Some(next_playable - 1)
        };

        rows.push(TrackRow {
            card,
            title: title.to_string(),
            year,
            links: track.links.iter().map(LinkView::from).collect(),
            needs_upload,
            playable,
        });
    }

    RenderedSection {
        key,
        intro: Some(Intro {
            card: bio_card,
            text: bio,
        }),
        chip_tags,
        body: SectionBody::Playlist(PlaylistBody { rows }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterEngine;
    use crate::registry::CardRegistry;
    use folio_common::content::{Link, Track, Year};
    use folio_common::MemoryStore;

    #[test]
    fn test_rows_and_playable_positions() {
        let musician = Musician {
            bio: Some("Songs".into()),
            tracks: vec![
                Track {
                    title: Some("A".into()),
                    file: Some("a.mp3".into()),
                    year: Some(Year::Number(2023)),
                    links: vec![Link {
                        label: Some("Bandcamp".into()),
                        url: Some("https://x.example".into()),
                    }],
                    drive_id: None,
                },
                Track {
                    title: Some("B".into()),
                    drive_id: Some("abc".into()),
                    year: Some(Year::Text("2021".into())),
                    ..Track::default()
                },
                Track {
                    title: Some("C".into()),
                    file: Some("c.mp3".into()),
                    year: Some(Year::Number(2023)),
                    ..Track::default()
                },
            ],
        };

        let mut registry = CardRegistry::new();
        let mut filters = FilterEngine::new();
        let store = MemoryStore::new();
        let mut ctx = RenderContext {
            registry: &mut registry,
            filters: &mut filters,
            store: &store,
            lightbox_items: Vec::new(),
        };
        let section = render(&musician, &mut ctx);

        assert_eq!(section.chip_tags, vec!["2021", "2023"]);
        let SectionBody::Playlist(body) = &section.body else {
            panic!("expected playlist body");
        };
        let playable: Vec<_> = body.rows.iter().map(|r| r.playable).collect();
        assert_eq!(playable, vec![Some(0), None, Some(1)]);
        assert!(body.rows[1].needs_upload);

        let card = registry.get(body.rows[0].card).unwrap();
        assert_eq!(card.tags, vec!["2023", "Bandcamp"]);
        // Bio plus three tracks
        assert_eq!(registry.len(), 4);
    }
}
