//! Session state holder
//!
//! One [`Session`] owns everything that was process-wide UI state: the
//! store, the card table, filters, the playlist and the three modals.
//! Controllers only see what they are handed, and every user gesture
//! enters through a method here.
//!
//! Time is explicit. Methods that start or observe timers (search
//! debounce, toast expiry, playback progress) take `now`, so callers decide
//! whether it is the wall clock or a scripted one.

use crate::audio::{AudioBackend, SimulatedAudio};
use crate::debounce::Debouncer;
use crate::details::DetailsCarousel;
use crate::filter::FilterEngine;
use crate::lightbox::Lightbox;
use crate::modal::{FocusTarget, InputRouter, Key, LightboxControl, ModalKind};
use crate::playlist::Playlist;
use crate::reader::Reader;
use crate::registry::{CardRegistry, SectionKey, SectionKind};
use crate::render::contact::contact_email;
use crate::render::{posts_of, render_document, RenderedPage};
use crate::theme::Theme;
use crate::toast::{Clipboard, MemoryClipboard, Toast};
use chrono::Datelike;
use folio_common::config::DEFAULT_SEARCH_DEBOUNCE_MS;
use folio_common::content::ContentDocument;
use folio_common::time::millis_to_duration;
use folio_common::{KeyValueStore, MemoryStore};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Message after a successful copy
pub const COPIED_MESSAGE: &str = "Copied!";

/// Message after a refused copy
pub const COPY_FAILED_MESSAGE: &str = "Copy failed";

/// Environment and collaborators a session starts with
pub struct SessionOptions {
    /// System colour-scheme preference, used when no theme is stored
    pub prefers_dark: bool,
    pub search_debounce: Duration,
    pub footer_year: i32,
    pub audio: Box<dyn AudioBackend>,
    pub clipboard: Box<dyn Clipboard>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            prefers_dark: false,
            search_debounce: millis_to_duration(DEFAULT_SEARCH_DEBOUNCE_MS),
            footer_year: chrono::Local::now().year(),
            audio: Box::new(SimulatedAudio::new()),
            clipboard: Box::new(MemoryClipboard::default()),
        }
    }
}

pub struct Session {
    pub(crate) doc: ContentDocument,
    pub(crate) page: RenderedPage,
    pub(crate) store: MemoryStore,
    pub(crate) registry: CardRegistry,
    pub(crate) filters: FilterEngine,
    pub(crate) search: Debouncer,
    /// Raw text in the global search box
    pub(crate) search_text: String,
    pub(crate) router: InputRouter,
    pub(crate) playlist: Playlist,
    pub(crate) lightbox: Lightbox,
    pub(crate) reader: Reader,
    pub(crate) details: DetailsCarousel,
    pub(crate) theme: Theme,
    pub(crate) toast: Toast,
    clipboard: Box<dyn Clipboard>,
}

impl Session {
    /// Render the document and restore persisted state
    pub fn new(doc: ContentDocument, store: MemoryStore, options: SessionOptions) -> Self {
        let mut store = store;
        let theme = Theme::resolve(&store, options.prefers_dark);
        theme.apply(&mut store);

        let mut registry = CardRegistry::new();
        let mut filters = FilterEngine::new();
        let page = render_document(&doc, &mut registry, &mut filters, &store, options.footer_year);

        let mut playlist = Playlist::new(&doc.musician.tracks, options.audio);
        playlist.restore(&store);
        let lightbox = Lightbox::new(page.lightbox_items.clone());

        info!(
            "Session ready: {} cards, {} playable tracks, theme {}",
            registry.len(),
            playlist.len(),
            theme
        );

        Self {
            doc,
            page,
            store,
            registry,
            filters,
            search: Debouncer::new(options.search_debounce),
            search_text: String::new(),
            router: InputRouter::new(),
            playlist,
            lightbox,
            reader: Reader::new(),
            details: DetailsCarousel::new(),
            theme,
            toast: Toast::new(),
            clipboard: options.clipboard,
        }
    }

    pub fn page(&self) -> &RenderedPage {
        &self.page
    }

    pub fn registry(&self) -> &CardRegistry {
        &self.registry
    }

    pub fn filters(&self) -> &FilterEngine {
        &self.filters
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn reader(&self) -> &Reader {
        &self.reader
    }

    pub fn details(&self) -> &DetailsCarousel {
        &self.details
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Store access for flushing changes to durable storage
    pub fn store_mut(&mut self) -> &mut MemoryStore {
        &mut self.store
    }

    // ---- search and filters ----

    /// Keystroke in the global search box; applied after the debounce
    pub fn search_input(&mut self, text: &str, now: Instant) {
        self.search_text = text.to_string();
        self.search.push(text, now);
    }

    /// Clear button: empty the box and apply immediately
    pub fn clear_search(&mut self) {
        self.search.cancel();
        self.search_text.clear();
        self.filters.set_query("", &mut self.registry);
        self.router.set_focus(FocusTarget::Search);
    }

    /// Apply a global query right away
    pub fn set_query(&mut self, query: &str) {
        self.search.cancel();
        self.search_text = query.to_string();
        self.filters.set_query(query, &mut self.registry);
    }

    pub fn set_section_query(&mut self, section: SectionKey, query: &str) {
        self.filters.set_section_query(section, query, &mut self.registry);
    }

    /// Chip or card tag click
    ///
    /// Project lists toggle the tag in their multi-select set; every other
    /// section makes it the single active tag.
    pub fn select_tag(&mut self, section: SectionKey, tag: &str) {
        match section.kind() {
            SectionKind::Projects => {
                self.filters
                    .toggle_multi_tag(section, tag, &mut self.registry, &mut self.store)
            }
            SectionKind::Contact => {}
            _ => self
                .filters
                .set_single_tag(section, tag, &mut self.registry, &mut self.store),
        }
    }

    /// "All" / "Clear filters" chip
    pub fn clear_filters(&mut self, section: SectionKey) {
        self.filters
            .clear_section(section, &mut self.registry, &mut self.store);
    }

    /// Fire due timers
    pub fn tick(&mut self, now: Instant) {
        if let Some(query) = self.search.poll(now) {
            debug!("Applying debounced query '{}'", query);
            self.filters.set_query(&query, &mut self.registry);
        }
        self.toast.tick(now);
    }

    /// Earliest pending timer
    pub fn next_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn search_pending(&self) -> bool {
        self.search.is_pending()
    }

    // ---- playlist ----

    pub fn select_track(&mut self, index: usize) {
        self.playlist.select_track(index, &mut self.store);
        self.router.set_focus(FocusTarget::Player);
    }

    pub fn play_track(&mut self, index: usize) {
        self.playlist.play_by_index(index, &mut self.store);
    }

    pub fn toggle_track(&mut self, index: usize) {
        self.playlist.toggle_for_index(index, &mut self.store);
    }

    pub fn toggle_play(&mut self) {
        self.playlist.toggle();
    }

    pub fn next_track(&mut self) {
        self.playlist.next(true, &mut self.store);
    }

    pub fn previous_track(&mut self) {
        self.playlist.previous(true, &mut self.store);
    }

    pub fn seek(&mut self, fraction: f64) {
        self.playlist.seek_to(fraction);
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.playlist.set_volume(volume);
    }

    /// Let playback run for `seconds`, ending at `now`
    pub fn advance_playback(&mut self, seconds: f64, now: Instant) {
        self.playlist.advance(seconds, now, &mut self.store);
    }

    // ---- modals ----

    pub fn open_lightbox(&mut self, index: usize) {
        self.lightbox.open(index, &mut self.router);
    }

    pub fn press_lightbox(&mut self, control: LightboxControl) {
        self.lightbox.press(control, &mut self.router);
    }

    pub fn swipe(&mut self, dx: f64, dy: f64) {
        self.lightbox.swipe(dx, dy, &mut self.router);
    }

    /// Open the reader on a post of a text-post section
    pub fn open_reader(&mut self, section: SectionKey, index: usize) {
        let (_, posts) = posts_of(&self.doc, section);
        if index >= posts.len() {
            warn!("No post {} in {}", index, section);
            return;
        }
        let posts = posts.to_vec();
        self.reader.open(section, posts, index, &mut self.router);
    }

    pub fn scroll_reader(&mut self, offset: f64) {
        self.reader.scroll_to(offset);
    }

    pub fn close_reader(&mut self) {
        self.reader.close(&mut self.router);
    }

    /// Open the details carousel on a project, over the visible projects
    pub fn open_details(&mut self, section: SectionKey, item: usize) {
        let projects = match section {
            SectionKey::Games => &self.doc.games.projects,
            SectionKey::Apps => &self.doc.apps.projects,
            _ => {
                warn!("{} has no project details", section);
                return;
            }
        };
        let visible = self.registry.visible_project_items(section);
        self.details
            .open(section, projects.clone(), item, visible, &mut self.router);
    }

    /// Close button or backdrop click
    pub fn close_details(&mut self) {
        self.details.close(&mut self.router);
    }

    /// Route one key press
    ///
    /// The focused player consumes its own keys. Otherwise every modal
    /// that was listening when the key arrived gets it, like document-level
    /// listeners do.
    pub fn handle_key(&mut self, key: Key) {
        if self.router.focus() == FocusTarget::Player && self.playlist.handle_key(key) {
            return;
        }
        for kind in self.router.listeners() {
            match kind {
                ModalKind::Lightbox => self.lightbox.handle_key(key, &mut self.router),
                ModalKind::Reader => self.reader.handle_key(key, &mut self.router),
                ModalKind::Details => self.details.handle_key(key, &mut self.router),
            };
        }
    }

    pub fn set_focus(&mut self, target: FocusTarget) {
        self.router.set_focus(target);
    }

    // ---- chrome ----

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.theme.apply(&mut self.store);
    }

    /// Copy the contact email and report the outcome in a toast
    pub fn copy_email(&mut self, now: Instant) {
        let email = contact_email(&self.doc.contact).to_string();
        match self.clipboard.write_text(&email) {
            Ok(()) => self.toast.show(COPIED_MESSAGE, now),
            Err(e) => {
                debug!("Copy failed: {}", e);
                self.toast.show(COPY_FAILED_MESSAGE, now);
            }
        }
    }

    pub fn toast(&self, now: Instant) -> Option<&str> {
        self.toast.visible(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> ContentDocument {
        ContentDocument::from_json(
            r#"{
                "site": {"name": "Ada"},
                "writer": {"posts": [
                    {"title": "One", "html": "<p>1</p>"},
                    {"title": "Two", "html": "<p>2</p>"}
                ]},
                "games": {"projects": [
                    {"title": "Old", "year": 2022},
                    {"title": "New", "year": 2023, "tags": ["demo"]}
                ]},
                "contact": {"email": "ada@example.com"}
            }"#,
        )
        .unwrap()
    }

    fn session() -> Session {
        Session::new(doc(), MemoryStore::new(), SessionOptions::default())
    }

    #[test]
    fn test_debounced_search_applies_last_value() {
        let mut s = session();
        let t0 = Instant::now();
        s.search_input("o", t0);
        s.search_input("ol", t0 + Duration::from_millis(50));

        s.tick(t0 + Duration::from_millis(150));
        assert_eq!(s.filters().state().query, "");
        s.tick(t0 + Duration::from_millis(170));
        assert_eq!(s.filters().state().query, "ol");
    }

    #[test]
    fn test_clear_search_is_immediate() {
        let mut s = session();
        let t0 = Instant::now();
        s.set_query("new");
        s.search_input("x", t0);
        s.clear_search();
        s.tick(t0 + Duration::from_secs(1));
        assert_eq!(s.filters().state().query, "");
        assert!(s.registry().iter().all(|c| c.visible));
    }

    #[test]
    fn test_escape_reaches_every_open_modal() {
        let mut s = session();
        s.open_reader(SectionKey::Writer, 0);
        s.open_details(SectionKey::Games, 1);
        assert_eq!(s.router().listeners().len(), 2);

        s.handle_key(Key::Escape);
        assert!(!s.reader().is_open());
        assert!(!s.details().is_open());
        assert!(s.router().listeners().is_empty());
    }

    #[test]
    fn test_player_focus_takes_space() {
        let mut s = Session::new(
            ContentDocument::from_json(r#"{"musician": {"tracks": [{"title": "A", "file": "a.mp3"}]}}"#)
                .unwrap(),
            MemoryStore::new(),
            SessionOptions::default(),
        );
        s.set_focus(FocusTarget::Player);
        s.handle_key(Key::Space);
        assert!(s.playlist().is_playing());
    }

    #[test]
    fn test_copy_email_toasts() {
        let t0 = Instant::now();
        let mut s = session();
        s.copy_email(t0);
        assert_eq!(s.toast(t0), Some(COPIED_MESSAGE));

        let mut refusing = Session::new(
            doc(),
            MemoryStore::new(),
            SessionOptions {
                clipboard: Box::new(MemoryClipboard {
                    contents: None,
                    refuse: true,
                }),
                ..SessionOptions::default()
            },
        );
        refusing.copy_email(t0);
        assert_eq!(refusing.toast(t0), Some(COPY_FAILED_MESSAGE));
    }

    #[test]
    fn test_theme_persisted_at_start_and_on_toggle() {
        let mut s = Session::new(
            doc(),
            MemoryStore::new(),
            SessionOptions {
                prefers_dark: true,
                ..SessionOptions::default()
            },
        );
        assert_eq!(s.theme(), Theme::Dark);
        assert_eq!(s.store().get("portfolio.theme").as_deref(), Some("dark"));

        s.toggle_theme();
        assert_eq!(s.store().get("portfolio.theme").as_deref(), Some("light"));
    }
}
