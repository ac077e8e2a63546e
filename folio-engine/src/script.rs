//! Command scripts for the headless driver
//!
//! One command per line; blank lines and `#` comments are skipped. The
//! runner keeps its own clock, starting at the moment it is created and
//! moving only on `wait` and `advance`, so a script replays identically.

use crate::error::{Error, Result};
use crate::modal::{FocusTarget, Key, LightboxControl};
use crate::registry::SectionKey;
use crate::session::Session;
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Longest stretch of playback one `advance` simulates
pub const MAX_ADVANCE: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Apply a global query immediately
    Query(String),
    /// Type into the global search box (debounced)
    Type(String),
    /// Clear the global search box
    ClearSearch,
    /// Let time pass and fire due timers
    Wait(Duration),
    SectionQuery(SectionKey, String),
    Tag(SectionKey, String),
    Clear(SectionKey),
    Select(usize),
    Play(usize),
    ToggleTrack(usize),
    Toggle,
    Next,
    Prev,
    Seek(f64),
    Volume(f64),
    /// Let playback run for some seconds
    Advance(f64),
    Lightbox(usize),
    LightboxButton(LightboxControl),
    Reader(SectionKey, usize),
    Details(SectionKey, usize),
    CloseDetails,
    Key(Key),
    Focus(FocusTarget),
    Swipe(f64, f64),
    Scroll(f64),
    Theme,
    CopyEmail,
    Show,
}

/// Parse one script line; `Ok(None)` for blanks and comments
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match name {
        "query" => Command::Query(rest.to_string()),
        "type" => Command::Type(rest.to_string()),
        "clear-search" => Command::ClearSearch,
        "wait" => Command::Wait(Duration::from_millis(number(name, &args, 0)?)),
        "section-query" => {
            let section = section(name, &args, 0)?;
            let text = rest.split_once(char::is_whitespace).map(|(_, q)| q.trim()).unwrap_or("");
            Command::SectionQuery(section, text.to_string())
        }
        "tag" | "multi" => Command::Tag(section(name, &args, 0)?, word(name, &args, 1)?.to_string()),
        "clear" => Command::Clear(section(name, &args, 0)?),
        "select" => Command::Select(number(name, &args, 0)?),
        "play" => Command::Play(number(name, &args, 0)?),
        "toggle-track" => Command::ToggleTrack(number(name, &args, 0)?),
        "toggle" => Command::Toggle,
        "next" => Command::Next,
        "prev" => Command::Prev,
        "seek" => Command::Seek(finite(name, &args, 0)?),
        "volume" => Command::Volume(finite(name, &args, 0)?),
        "advance" => Command::Advance(finite(name, &args, 0)?),
        "lightbox" => Command::Lightbox(number(name, &args, 0)?),
        "lightbox-button" => Command::LightboxButton(control(name, word(name, &args, 0)?)?),
        "reader" => Command::Reader(section(name, &args, 0)?, number(name, &args, 1)?),
        "details" => Command::Details(section(name, &args, 0)?, number(name, &args, 1)?),
        "close-details" => Command::CloseDetails,
        "key" => Command::Key(word(name, &args, 0)?.parse().map_err(|e: String| Error::invalid(name, e))?),
        "focus" => Command::Focus(focus(name, &args)?),
        "swipe" => Command::Swipe(finite(name, &args, 0)?, finite(name, &args, 1)?),
        "scroll" => Command::Scroll(finite(name, &args, 0)?),
        "theme" => Command::Theme,
        "copy-email" => Command::CopyEmail,
        "show" => Command::Show,
        other => return Err(Error::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn word<'a>(command: &str, args: &[&'a str], at: usize) -> Result<&'a str> {
    args.get(at)
        .copied()
        .ok_or_else(|| Error::invalid(command, format!("missing argument {}", at + 1)))
}

fn number<T: std::str::FromStr>(command: &str, args: &[&str], at: usize) -> Result<T> {
    let raw = word(command, args, at)?;
    raw.parse()
        .map_err(|_| Error::invalid(command, format!("'{}' is not a number", raw)))
}

fn finite(command: &str, args: &[&str], at: usize) -> Result<f64> {
    let value: f64 = number(command, args, at)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::invalid(command, format!("'{}' is not a finite number", value)))
    }
}

fn section(command: &str, args: &[&str], at: usize) -> Result<SectionKey> {
    word(command, args, at)?
        .parse()
        .map_err(|e: String| Error::invalid(command, e))
}

fn control(command: &str, raw: &str) -> Result<LightboxControl> {
    match raw {
        "zoom" => Ok(LightboxControl::Zoom),
        "prev" => Ok(LightboxControl::Prev),
        "next" => Ok(LightboxControl::Next),
        "close" => Ok(LightboxControl::Close),
        "download" => Ok(LightboxControl::Download),
        _ => Err(Error::invalid(command, format!("unknown control '{}'", raw))),
    }
}

fn focus(command: &str, args: &[&str]) -> Result<FocusTarget> {
    match word(command, args, 0)? {
        "page" => Ok(FocusTarget::Page),
        "search" => Ok(FocusTarget::Search),
        "player" => Ok(FocusTarget::Player),
        "section-search" => Ok(FocusTarget::SectionSearch {
            section: section(command, args, 1)?,
        }),
        other => Err(Error::invalid(command, format!("cannot focus '{}'", other))),
    }
}

/// Read a script from a file, or from stdin when no path is given
pub async fn read_script(path: Option<&Path>) -> Result<String> {
    let script = match path {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut script = String::new();
            std::io::stdin().read_to_string(&mut script)?;
            script
        }
    };
    if script.trim().is_empty() {
        warn!("Empty script; nothing to replay");
    }
    Ok(script)
}

/// Drives a session from commands on a scripted clock
pub struct ScriptRunner<'a> {
    session: &'a mut Session,
    now: Instant,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self {
            session,
            now: Instant::now(),
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Run a whole script; bad lines are reported and skipped
    ///
    /// Returns the JSON snapshots produced by `show`.
    pub fn run(&mut self, script: &str) -> Vec<String> {
        let mut shown = Vec::new();
        for (number, line) in script.lines().enumerate() {
            match parse_line(line) {
                Ok(Some(command)) => {
                    if let Some(snapshot) = self.execute(command) {
                        shown.push(snapshot);
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("Skipping script line {}: {}", number + 1, e),
            }
        }
        shown
    }

    /// Apply one command; `show` yields a JSON snapshot
    pub fn execute(&mut self, command: Command) -> Option<String> {
        debug!("Executing {:?}", command);
        let s = &mut *self.session;
        match command {
            Command::Query(q) => s.set_query(&q),
            Command::Type(text) => s.search_input(&text, self.now),
            Command::ClearSearch => s.clear_search(),
            Command::Wait(duration) => {
                self.now += duration;
                s.tick(self.now);
            }
            Command::SectionQuery(section, q) => s.set_section_query(section, &q),
            Command::Tag(section, tag) => s.select_tag(section, &tag),
            Command::Clear(section) => s.clear_filters(section),
            Command::Select(i) => s.select_track(i),
            Command::Play(i) => s.play_track(i),
            Command::ToggleTrack(i) => s.toggle_track(i),
            Command::Toggle => s.toggle_play(),
            Command::Next => s.next_track(),
            Command::Prev => s.previous_track(),
            Command::Seek(fraction) => s.seek(fraction),
            Command::Volume(v) => s.set_volume(v),
            Command::Advance(seconds) => {
                let limit = MAX_ADVANCE.as_secs_f64();
                if seconds > limit {
                    warn!("Advance of {}s capped at {}s", seconds, limit);
                }
                // Step a second at a time so progress saves see real spacing
                let mut left = seconds.clamp(0.0, limit);
                while left > 0.0 {
                    if !s.playlist().is_playing() {
                        self.now += Duration::from_secs_f64(left);
                        break;
                    }
                    let step = left.min(1.0);
                    self.now += Duration::from_secs_f64(step);
                    s.advance_playback(step, self.now);
                    left -= step;
                }
                s.tick(self.now);
            }
            Command::Lightbox(i) => s.open_lightbox(i),
            Command::LightboxButton(control) => s.press_lightbox(control),
            Command::Reader(section, i) => s.open_reader(section, i),
            Command::Details(section, i) => s.open_details(section, i),
            Command::CloseDetails => s.close_details(),
            Command::Key(key) => s.handle_key(key),
            Command::Focus(target) => s.set_focus(target),
            Command::Swipe(dx, dy) => s.swipe(dx, dy),
            Command::Scroll(offset) => s.scroll_reader(offset),
            Command::Theme => s.toggle_theme(),
            Command::CopyEmail => s.copy_email(self.now),
            Command::Show => {
                return match serde_json::to_string_pretty(&s.view(self.now)) {
                    Ok(json) => Some(json),
                    Err(e) => {
                        warn!("Could not serialise snapshot: {}", e);
                        None
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line("  # note").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(
            parse_line("query level design").unwrap(),
            Some(Command::Query("level design".into()))
        );
        assert_eq!(
            parse_line("section-query writer  loops and arcs").unwrap(),
            Some(Command::SectionQuery(SectionKey::Writer, "loops and arcs".into()))
        );
        assert_eq!(
            parse_line("multi games 2023").unwrap(),
            Some(Command::Tag(SectionKey::Games, "2023".into()))
        );
        assert_eq!(
            parse_line("wait 150").unwrap(),
            Some(Command::Wait(Duration::from_millis(150)))
        );
        assert_eq!(parse_line("key Shift+Tab").unwrap(), Some(Command::Key(Key::BackTab)));
        assert_eq!(
            parse_line("swipe -50 3").unwrap(),
            Some(Command::Swipe(-50.0, 3.0))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_line("dance"), Err(Error::UnknownCommand(_))));
        assert!(matches!(parse_line("reader blog 1"), Err(Error::InvalidArguments { .. })));
        assert!(matches!(parse_line("play one"), Err(Error::InvalidArguments { .. })));
        assert!(matches!(parse_line("details games"), Err(Error::InvalidArguments { .. })));
    }

    #[tokio::test]
    async fn test_read_script_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tour.txt");
        std::fs::write(&path, "theme\nshow\n").unwrap();

        assert_eq!(read_script(Some(&path)).await.unwrap(), "theme\nshow\n");
        assert!(matches!(
            read_script(Some(&dir.path().join("missing.txt"))).await,
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for line in ["advance inf", "advance NaN", "seek -inf", "volume nan", "scroll inf", "swipe 1 inf"] {
            assert!(
                matches!(parse_line(line), Err(Error::InvalidArguments { .. })),
                "{} should be rejected",
                line
            );
        }
        assert_eq!(parse_line("advance 1e9").unwrap(), Some(Command::Advance(1e9)));
    }
}
