//! Playlist and audio controller
//!
//! Holds the playable tracks (file-backed only), the current index and the
//! one shared [`AudioBackend`]. Status is derived from the backend:
//!
//! ```text
//! Idle ──select/restore──▶ Loaded ──play──▶ Playing ◀──toggle──▶ Paused
//!                             ▲                │ ended
//!                             └────── next ◀───┘ (autoplay)
//! ```
//!
//! Position is persisted as `{index, time}` at most once per second while
//! time advances, and whenever the track changes.

use crate::audio::AudioBackend;
use crate::modal::Key;
use folio_common::content::{non_empty, Link, Track};
use folio_common::storage::{get_json, set_json, KeyValueStore, AUDIO_STATE_KEY};
use folio_common::time::format_clock;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Minimum spacing between progress writes
pub const SAVE_INTERVAL: Duration = Duration::from_millis(1000);

/// Seek fractions stop this far before the end so `ended` is not fired
const SEEK_END_GUARD: f64 = 0.25;

/// Keyboard seeks stop this far before the end
const KEY_SEEK_END_GUARD: f64 = 0.1;

/// Keyboard seek step in seconds
const KEY_SEEK_STEP: f64 = 5.0;

pub const PLAY_GLYPH: &str = "▶";
pub const PAUSE_GLYPH: &str = "⏸";

/// Derived transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    /// No source loaded
    Idle,
    /// Source loaded, never started since loading
    Loaded,
    Playing,
    Paused,
}

/// Persisted playback position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioState {
    pub index: i64,
    pub time: f64,
}

/// Options offered by the link picker for the current track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkChoices {
    /// First, empty option: "Select link…" or "No links"
    pub placeholder: &'static str,
    /// `(label, url)` pairs
    pub links: Vec<(String, String)>,
    pub open_enabled: bool,
}

pub struct Playlist {
    tracks: Vec<Track>,
    index: usize,
    audio: Box<dyn AudioBackend>,
    started: bool,
    last_save: Option<Instant>,
}

impl std::fmt::Debug for Playlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playlist")
            .field("tracks", &self.tracks.len())
            .field("index", &self.index)
            .field("status", &self.status())
            .finish()
    }
}

impl Playlist {
    /// Build over the playable subset of `tracks`
    pub fn new(tracks: &[Track], audio: Box<dyn AudioBackend>) -> Self {
        let tracks: Vec<Track> = tracks.iter().filter(|t| t.is_playable()).cloned().collect();
        Self {
            tracks,
            index: 0,
            audio,
            started: false,
            last_save: None,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.index)
    }

    pub fn audio(&self) -> &dyn AudioBackend {
        self.audio.as_ref()
    }

    pub fn status(&self) -> PlayerStatus {
        if self.audio.source().is_none() {
            PlayerStatus::Idle
        } else if self.is_playing() {
            PlayerStatus::Playing
        } else if self.started {
            PlayerStatus::Paused
        } else {
            PlayerStatus::Loaded
        }
    }

    pub fn is_playing(&self) -> bool {
        !self.audio.is_paused() && !self.audio.has_ended()
    }

    /// Load the saved track paused at the saved time, else track 0
    pub fn restore(&mut self, store: &dyn KeyValueStore) {
        if self.tracks.is_empty() {
            return;
        }
        let saved: Option<AudioState> = get_json(store, AUDIO_STATE_KEY);
        match saved {
            Some(state) if state.index >= 0 && (state.index as usize) < self.tracks.len() => {
                info!("Restoring track {} at {:.1}s", state.index, state.time);
                self.load_track(state.index as usize, false, state.time);
            }
            _ => self.load_track(0, false, 0.0),
        }
    }

    /// Make `index` current without starting playback
    pub fn select_track(&mut self, index: usize, store: &mut dyn KeyValueStore) {
        if index >= self.tracks.len() {
            return;
        }
        self.index = index;
        self.set_source_for_current();
        self.save(store);
    }

    /// Select `index` and start playback from the top
    pub fn play_by_index(&mut self, index: usize, store: &mut dyn KeyValueStore) {
        if self.tracks.is_empty() {
            return;
        }
        self.load_track(index, true, 0.0);
        self.save(store);
    }

    /// Row play button: switch tracks, or toggle the current one
    pub fn toggle_for_index(&mut self, index: usize, store: &mut dyn KeyValueStore) {
        if index != self.index || self.audio.source().is_none() {
            self.play_by_index(index, store);
            return;
        }
        self.toggle();
    }

    /// Main play button
    pub fn toggle(&mut self) {
        if self.audio.is_paused() {
            self.start();
        } else {
            self.audio.pause();
        }
    }

    pub fn next(&mut self, autoplay: bool, store: &mut dyn KeyValueStore) {
        let len = self.tracks.len();
        if len == 0 {
            return;
        }
        self.load_track((self.index + 1) % len, autoplay, 0.0);
        self.save(store);
    }

    pub fn previous(&mut self, autoplay: bool, store: &mut dyn KeyValueStore) {
        let len = self.tracks.len();
        if len == 0 {
            return;
        }
        self.load_track((self.index + len - 1) % len, autoplay, 0.0);
        self.save(store);
    }

    /// Seek to a fraction of the track, kept short of the end
    pub fn seek_to(&mut self, fraction: f64) {
        let Some(duration) = self.audio.duration() else {
            return;
        };
        let target = (duration * fraction).min(duration - SEEK_END_GUARD).max(0.0);
        self.audio.set_current_time(target);
    }

    /// Relative seek in seconds, as the arrow keys do
    pub fn seek_by(&mut self, delta: f64) {
        let Some(duration) = self.audio.duration() else {
            return;
        };
        let target = (self.audio.current_time() + delta)
            .min(duration - KEY_SEEK_END_GUARD)
            .max(0.0);
        self.audio.set_current_time(target);
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.audio.set_volume(volume);
    }

    /// Let wall time pass and react to time updates and the end of a track
    ///
    /// A paused or finished player has no time updates and saves nothing.
    pub fn advance(&mut self, seconds: f64, now: Instant, store: &mut dyn KeyValueStore) {
        if !self.is_playing() {
            return;
        }
        if self.audio.advance(seconds) {
            self.on_ended(store);
        } else {
            self.on_time_update(now, store);
        }
    }

    /// Throttled progress persistence
    pub fn on_time_update(&mut self, now: Instant, store: &mut dyn KeyValueStore) {
        let due = match self.last_save {
            Some(last) => now.duration_since(last) > SAVE_INTERVAL,
            None => true,
        };
        if due {
            self.save(store);
            self.last_save = Some(now);
        }
    }

    /// Natural end of a track advances with autoplay
    pub fn on_ended(&mut self, store: &mut dyn KeyValueStore) {
        debug!("Track {} ended", self.index);
        self.next(true, store);
    }

    /// Keys while the player has focus; returns true when consumed
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Space => self.toggle(),
            Key::ArrowLeft => self.seek_by(-KEY_SEEK_STEP),
            Key::ArrowRight => self.seek_by(KEY_SEEK_STEP),
            _ => return false,
        }
        true
    }

    /// Title shown above the transport
    pub fn title(&self) -> &str {
        self.current()
            .and_then(|t| non_empty(&t.title))
            .unwrap_or("—")
    }

    pub fn elapsed_label(&self) -> String {
        format_clock(self.audio.current_time())
    }

    pub fn duration_label(&self) -> String {
        format_clock(self.audio.duration().unwrap_or(0.0))
    }

    /// Seek bar position in percent
    pub fn seek_percent(&self) -> f64 {
        match self.audio.duration() {
            Some(d) if d > 0.0 => self.audio.current_time() / d * 100.0,
            _ => 0.0,
        }
    }

    /// Main button glyph
    pub fn play_glyph(&self) -> &'static str {
        if self.is_playing() {
            PAUSE_GLYPH
        } else {
            PLAY_GLYPH
        }
    }

    /// Glyph for each playable row; only the current row shows pause
    pub fn row_glyphs(&self) -> Vec<&'static str> {
        let playing = self.is_playing();
        (0..self.tracks.len())
            .map(|i| if playing && i == self.index { PAUSE_GLYPH } else { PLAY_GLYPH })
            .collect()
    }

    pub fn link_choices(&self) -> LinkChoices {
        let links: Vec<(String, String)> = self
            .current()
            .map(|t| t.links.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|l: &Link| (l.display_label().to_string(), l.href().to_string()))
            .collect();
        LinkChoices {
            placeholder: if links.is_empty() { "No links" } else { "Select link…" },
            open_enabled: !links.is_empty(),
            links,
        }
    }

    fn load_track(&mut self, index: usize, autoplay: bool, start_time: f64) {
        self.index = index.min(self.tracks.len().saturating_sub(1));
        self.set_source_for_current();
        self.audio.set_current_time(start_time.max(0.0));
        if autoplay {
            self.start();
        }
    }

    fn set_source_for_current(&mut self) {
        let Some(file) = self.current().and_then(|t| t.file.clone()) else {
            return;
        };
        self.audio.set_source(&file);
        self.started = false;
    }

    /// Best-effort start; a platform refusal leaves the player paused
    fn start(&mut self) {
        match self.audio.play() {
            Ok(()) => self.started = true,
            Err(e) => debug!("Ignoring playback start failure: {}", e),
        }
    }

    fn save(&self, store: &mut dyn KeyValueStore) {
        if self.tracks.is_empty() {
            return;
        }
        let state = AudioState {
            index: self.index as i64,
            time: self.audio.current_time(),
        };
        set_json(store, AUDIO_STATE_KEY, &state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SimulatedAudio;
    use folio_common::MemoryStore;

    fn track(title: &str, file: Option<&str>, drive: Option<&str>) -> Track {
        Track {
            title: Some(title.to_string()),
            file: file.map(String::from),
            drive_id: drive.map(String::from),
            ..Track::default()
        }
    }

    fn three_tracks() -> Vec<Track> {
        vec![
            track("One", Some("one.mp3"), None),
            track("Gone", None, Some("drive-1")),
            track("Two", Some("two.mp3"), None),
            track("Empty", None, None),
            track("Three", Some("three.mp3"), None),
        ]
    }

    fn playlist() -> Playlist {
        Playlist::new(&three_tracks(), Box::new(SimulatedAudio::new()))
    }

    fn saved(store: &MemoryStore) -> AudioState {
        serde_json::from_str(&store.get(AUDIO_STATE_KEY).unwrap()).unwrap()
    }

    #[test]
    fn test_placeholder_tracks_excluded() {
        let p = playlist();
        let titles: Vec<_> = p.tracks().iter().map(|t| t.title.clone().unwrap()).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
        assert_eq!(p.status(), PlayerStatus::Idle);
    }

    #[test]
    fn test_next_is_circular() {
        let mut store = MemoryStore::new();
        for start in 0..3 {
            let mut p = playlist();
            p.select_track(start, &mut store);
            for _ in 0..p.len() {
                p.next(false, &mut store);
            }
            assert_eq!(p.index(), start);
        }
    }

    #[test]
    fn test_previous_wraps_to_end() {
        let mut store = MemoryStore::new();
        let mut p = playlist();
        p.restore(&store);
        p.previous(false, &mut store);
        assert_eq!(p.index(), 2);
        assert_eq!(p.audio().source(), Some("three.mp3"));
    }

    #[test]
    fn test_select_does_not_start_playback() {
        let mut store = MemoryStore::new();
        let mut p = playlist();
        p.select_track(1, &mut store);
        assert_eq!(p.status(), PlayerStatus::Loaded);
        assert_eq!(p.title(), "Two");
        assert_eq!(saved(&store).index, 1);
    }

    #[test]
    fn test_toggle_for_index() {
        let mut store = MemoryStore::new();
        let mut p = playlist();
        p.restore(&store);

        // Different row switches and plays
        p.toggle_for_index(2, &mut store);
        assert_eq!(p.index(), 2);
        assert_eq!(p.status(), PlayerStatus::Playing);
        assert_eq!(p.row_glyphs(), vec![PLAY_GLYPH, PLAY_GLYPH, PAUSE_GLYPH]);

        // Same row pauses, then resumes
        p.toggle_for_index(2, &mut store);
        assert_eq!(p.status(), PlayerStatus::Paused);
        p.toggle_for_index(2, &mut store);
        assert_eq!(p.status(), PlayerStatus::Playing);
    }

    #[test]
    fn test_rejected_playback_is_swallowed() {
        let mut store = MemoryStore::new();
        let mut audio = SimulatedAudio::new();
        audio.autoplay_blocked = true;
        let mut p = Playlist::new(&three_tracks(), Box::new(audio));
        p.restore(&store);

        p.play_by_index(1, &mut store);
        assert_eq!(p.index(), 1);
        assert_eq!(p.status(), PlayerStatus::Loaded);
    }

    #[test]
    fn test_seek_clamps_before_end() {
        let mut store = MemoryStore::new();
        let audio = SimulatedAudio::new().with_duration("one.mp3", 100.0);
        let mut p = Playlist::new(&three_tracks(), Box::new(audio));

        // No metadata yet: ignored
        p.seek_to(0.5);
        assert_eq!(p.audio().current_time(), 0.0);

        p.select_track(0, &mut store);
        p.seek_to(1.0);
        assert_eq!(p.audio().current_time(), 99.75);
        p.seek_to(-1.0);
        assert_eq!(p.audio().current_time(), 0.0);
        p.seek_to(0.5);
        assert_eq!(p.seek_percent(), 50.0);

        p.seek_by(100.0);
        assert_eq!(p.audio().current_time(), 99.9);
        p.seek_by(-500.0);
        assert_eq!(p.audio().current_time(), 0.0);
    }

    #[test]
    fn test_restore_saved_position() {
        let mut store = MemoryStore::new();
        store.set(AUDIO_STATE_KEY, r#"{"index":2,"time":42.5}"#);
        let mut p = playlist();
        p.restore(&store);
        assert_eq!(p.index(), 2);
        assert_eq!(p.audio().current_time(), 42.5);
        assert_eq!(p.status(), PlayerStatus::Loaded);
        assert_eq!(p.elapsed_label(), "0:42");
    }

    #[test]
    fn test_restore_out_of_range_or_corrupt_falls_back() {
        for raw in [r#"{"index":3,"time":1}"#, r#"{"index":-1,"time":1}"#, "garbage", r#"{"index":1}"#] {
            let mut store = MemoryStore::new();
            store.set(AUDIO_STATE_KEY, raw);
            let mut p = playlist();
            p.restore(&store);
            assert_eq!(p.index(), 0, "input {}", raw);
            assert_eq!(p.audio().current_time(), 0.0);
        }
    }

    #[test]
    fn test_progress_saves_are_throttled() {
        let mut store = MemoryStore::new();
        let mut p = playlist();
        p.restore(&store);
        p.toggle();

        let t0 = Instant::now();
        p.advance(0.5, t0, &mut store);
        assert_eq!(saved(&store).time, 0.5);

        p.advance(0.5, t0 + Duration::from_millis(500), &mut store);
        assert_eq!(saved(&store).time, 0.5);

        p.advance(0.75, t0 + Duration::from_millis(1100), &mut store);
        assert_eq!(saved(&store).time, 1.75);
    }

    #[test]
    fn test_paused_advance_saves_nothing() {
        let mut store = MemoryStore::new();
        let mut p = playlist();
        p.restore(&store);

        p.advance(2.0, Instant::now(), &mut store);
        assert!(store.get(AUDIO_STATE_KEY).is_none());
        assert_eq!(p.audio().current_time(), 0.0);

        let t0 = Instant::now();
        p.toggle();
        p.advance(1.0, t0, &mut store);
        p.toggle();
        p.seek_to(0.5);
        p.advance(1.0, t0 + Duration::from_secs(5), &mut store);
        assert_eq!(saved(&store).time, 1.0);
    }

    #[test]
    fn test_end_of_track_autoplays_next() {
        let mut store = MemoryStore::new();
        let audio = SimulatedAudio::new().with_duration("one.mp3", 3.0);
        let mut p = Playlist::new(&three_tracks(), Box::new(audio));
        p.restore(&store);
        p.toggle();

        p.advance(5.0, Instant::now(), &mut store);
        assert_eq!(p.index(), 1);
        assert_eq!(p.status(), PlayerStatus::Playing);
        assert_eq!(saved(&store), AudioState { index: 1, time: 0.0 });
    }

    #[test]
    fn test_player_keys() {
        let store = MemoryStore::new();
        let mut p = playlist();
        p.restore(&store);

        assert!(p.handle_key(Key::Space));
        assert!(p.is_playing());
        assert!(p.handle_key(Key::ArrowRight));
        assert_eq!(p.audio().current_time(), 5.0);
        assert!(!p.handle_key(Key::Escape));
    }

    #[test]
    fn test_link_choices() {
        let mut tracks = three_tracks();
        tracks[0].links = vec![Link {
            label: None,
            url: Some("https://example.com/one".into()),
        }];
        let mut store = MemoryStore::new();
        let mut p = Playlist::new(&tracks, Box::new(SimulatedAudio::new()));
        p.restore(&store);

        let choices = p.link_choices();
        assert_eq!(choices.placeholder, "Select link…");
        assert_eq!(choices.links, vec![("Link".to_string(), "https://example.com/one".to_string())]);
        assert!(choices.open_enabled);

        p.next(false, &mut store);
        assert_eq!(p.link_choices().placeholder, "No links");
        assert!(!p.link_choices().open_enabled);
    }

    #[test]
    fn test_empty_playlist_is_inert() {
        let mut store = MemoryStore::new();
        let mut p = Playlist::new(&[], Box::new(SimulatedAudio::new()));
        p.restore(&store);
        p.next(true, &mut store);
        p.previous(true, &mut store);
        p.play_by_index(0, &mut store);
        assert_eq!(p.status(), PlayerStatus::Idle);
        assert_eq!(p.title(), "—");
        assert!(store.is_empty());
    }
}
