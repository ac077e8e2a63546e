//! Audio resource abstraction
//!
//! The playlist drives exactly one audio resource for the whole session.
//! [`AudioBackend`] is the seam: a browser element, a native output, or the
//! [`SimulatedAudio`] clock used by the headless driver and the tests.

use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Length assumed for a source with no known duration
pub const DEFAULT_TRACK_SECONDS: f64 = 180.0;

/// Platform refused to start playback (autoplay policy, missing device)
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Playback rejected: {0}")]
pub struct PlaybackRejected(pub String);

/// The single shared audio resource
pub trait AudioBackend {
    /// Swap the source; position resets and the resource pauses
    fn set_source(&mut self, src: &str);

    fn source(&self) -> Option<&str>;

    /// Start or resume playback
    fn play(&mut self) -> Result<(), PlaybackRejected>;

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    /// Reached the end of the current source
    fn has_ended(&self) -> bool;

    /// Position in seconds
    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    /// Length in seconds, `None` until metadata is known
    fn duration(&self) -> Option<f64>;

    /// Linear gain in `0.0..=1.0`
    fn volume(&self) -> f64;

    fn set_volume(&mut self, volume: f64);

    /// Let `seconds` of wall time pass; returns true when the source ended
    fn advance(&mut self, seconds: f64) -> bool;
}

/// Clock-only audio resource
///
/// Durations can be registered per source; anything else lasts
/// [`DEFAULT_TRACK_SECONDS`]. Setting `autoplay_blocked` makes every `play`
/// fail the way a browser does before the first user gesture.
#[derive(Debug, Clone)]
pub struct SimulatedAudio {
    source: Option<String>,
    durations: HashMap<String, f64>,
    position: f64,
    paused: bool,
    ended: bool,
    volume: f64,
    pub autoplay_blocked: bool,
}

impl Default for SimulatedAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedAudio {
    pub fn new() -> Self {
        Self {
            source: None,
            durations: HashMap::new(),
            position: 0.0,
            paused: true,
            ended: false,
            volume: 1.0,
            autoplay_blocked: false,
        }
    }

    /// Register the length of one source
    pub fn with_duration(mut self, src: &str, seconds: f64) -> Self {
        self.durations.insert(src.to_string(), seconds);
        self
    }
}

impl AudioBackend for SimulatedAudio {
    fn set_source(&mut self, src: &str) {
        self.source = Some(src.to_string());
        self.position = 0.0;
        self.paused = true;
        self.ended = false;
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn play(&mut self) -> Result<(), PlaybackRejected> {
        if self.source.is_none() {
            return Err(PlaybackRejected("no source".to_string()));
        }
        if self.autoplay_blocked {
            return Err(PlaybackRejected("autoplay not allowed".to_string()));
        }
        if self.ended {
            self.position = 0.0;
            self.ended = false;
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn has_ended(&self) -> bool {
        self.ended
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut position = seconds.max(0.0);
        if let Some(duration) = self.duration() {
            position = position.min(duration);
        }
        self.position = position;
        self.ended = false;
    }

    fn duration(&self) -> Option<f64> {
        let src = self.source.as_ref()?;
        Some(self.durations.get(src).copied().unwrap_or(DEFAULT_TRACK_SECONDS))
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn advance(&mut self, seconds: f64) -> bool {
        if self.paused || self.ended || seconds <= 0.0 {
            return false;
        }
        self.position += seconds;
        match self.duration() {
            Some(duration) if self.position >= duration => {
                self.position = duration;
                self.paused = true;
                self.ended = true;
                debug!("Simulated source ended at {:.1}s", duration);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_requires_source() {
        let mut audio = SimulatedAudio::new();
        assert!(audio.play().is_err());
        audio.set_source("a.mp3");
        assert!(audio.play().is_ok());
        assert!(!audio.is_paused());
    }

    #[test]
    fn test_blocked_autoplay_rejects() {
        let mut audio = SimulatedAudio::new();
        audio.autoplay_blocked = true;
        audio.set_source("a.mp3");
        assert_eq!(
            audio.play(),
            Err(PlaybackRejected("autoplay not allowed".to_string()))
        );
        assert!(audio.is_paused());
    }

    #[test]
    fn test_advance_reaches_end() {
        let mut audio = SimulatedAudio::new().with_duration("a.mp3", 10.0);
        audio.set_source("a.mp3");
        audio.play().unwrap();

        assert!(!audio.advance(4.0));
        assert_eq!(audio.current_time(), 4.0);
        assert!(audio.advance(7.0));
        assert!(audio.has_ended());
        assert!(audio.is_paused());
        assert_eq!(audio.current_time(), 10.0);

        // Paused resources do not move
        assert!(!audio.advance(1.0));
    }

    #[test]
    fn test_volume_clamped() {
        let mut audio = SimulatedAudio::new();
        audio.set_volume(1.7);
        assert_eq!(audio.volume(), 1.0);
        audio.set_volume(-0.2);
        assert_eq!(audio.volume(), 0.0);
    }
}
