//! Modal input routing
//!
//! Each modal (lightbox, reader, details) reacts to global key events only
//! while it holds a [`ModalScope`]. Acquiring a scope registers the modal
//! as a key listener and captures where focus was; releasing it removes the
//! listener and puts focus back. Controllers keep the scope in an `Option`
//! and every close path hands it back to the router, so a closed modal can
//! never see another key event.

use crate::registry::{CardId, SectionKey};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Modal widgets that listen for global keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalKind {
    Lightbox,
    Reader,
    Details,
}

/// Lightbox controls in focus-trap order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LightboxControl {
    Zoom,
    Prev,
    Next,
    Close,
    Download,
}

impl LightboxControl {
    /// Tab order inside the lightbox
    pub const TRAP_ORDER: [LightboxControl; 5] = [
        LightboxControl::Zoom,
        LightboxControl::Prev,
        LightboxControl::Next,
        LightboxControl::Close,
        LightboxControl::Download,
    ];
}

/// Where keyboard focus currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum FocusTarget {
    /// Nothing in particular (document body)
    Page,
    /// Global search box
    Search,
    /// Per-section search box
    SectionSearch { section: SectionKey },
    /// The audio player group
    Player,
    /// A card's primary control
    Card { card: CardId },
    /// One of the lightbox buttons
    Lightbox { control: LightboxControl },
    /// The lightbox image stage
    LightboxStage,
    /// Reader modal
    Reader,
    /// Details modal
    Details,
}

/// A key press as the routers see it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Tab,
    /// Shift+Tab
    BackTab,
    Space,
    Char(char),
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Escape" | "Esc" => Ok(Key::Escape),
            "ArrowLeft" | "Left" => Ok(Key::ArrowLeft),
            "ArrowRight" | "Right" => Ok(Key::ArrowRight),
            "Tab" => Ok(Key::Tab),
            "Shift+Tab" | "BackTab" => Ok(Key::BackTab),
            "Space" | " " => Ok(Key::Space),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Key::Char(c)),
                    _ => Err(format!("unknown key '{}'", s)),
                }
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Escape => f.write_str("Escape"),
            Key::ArrowLeft => f.write_str("ArrowLeft"),
            Key::ArrowRight => f.write_str("ArrowRight"),
            Key::Tab => f.write_str("Tab"),
            Key::BackTab => f.write_str("Shift+Tab"),
            Key::Space => f.write_str("Space"),
            Key::Char(c) => write!(f, "{}", c),
        }
    }
}

/// Proof that a modal is listening; must be handed back on close
#[must_use = "a modal scope must be released through InputRouter::release"]
#[derive(Debug)]
pub struct ModalScope {
    kind: ModalKind,
    token: u64,
    prior_focus: FocusTarget,
}

impl ModalScope {
    pub fn kind(&self) -> ModalKind {
        self.kind
    }

    /// Focus that will be restored on release
    pub fn prior_focus(&self) -> FocusTarget {
        self.prior_focus
    }
}

/// Registered key listeners and the current focus
#[derive(Debug)]
pub struct InputRouter {
    listeners: Vec<(u64, ModalKind)>,
    focus: FocusTarget,
    next_token: u64,
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl InputRouter {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            focus: FocusTarget::Page,
            next_token: 1,
        }
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    pub fn set_focus(&mut self, target: FocusTarget) {
        self.focus = target;
    }

    /// Register `kind` as a key listener and move focus into it
    pub fn acquire(&mut self, kind: ModalKind, initial_focus: FocusTarget) -> ModalScope {
        let token = self.next_token;
        self.next_token += 1;
        self.listeners.push((token, kind));

        let prior_focus = self.focus;
        self.focus = initial_focus;
        debug!("Modal {:?} acquired input (prior focus {:?})", kind, prior_focus);

        ModalScope {
            kind,
            token,
            prior_focus,
        }
    }

    /// Unregister the scope's listener and restore the captured focus
    pub fn release(&mut self, scope: ModalScope) {
        self.listeners.retain(|(token, _)| *token != scope.token);
        self.focus = scope.prior_focus;
        debug!("Modal {:?} released input", scope.kind);
    }

    /// Modals currently listening, in registration order
    pub fn listeners(&self) -> Vec<ModalKind> {
        self.listeners.iter().map(|(_, kind)| *kind).collect()
    }

    pub fn is_listening(&self, kind: ModalKind) -> bool {
        self.listeners.iter().any(|(_, k)| *k == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_release_restore_focus() {
        let mut router = InputRouter::new();
        router.set_focus(FocusTarget::Search);

        let scope = router.acquire(ModalKind::Reader, FocusTarget::Reader);
        assert!(router.is_listening(ModalKind::Reader));
        assert_eq!(router.focus(), FocusTarget::Reader);
        assert_eq!(scope.prior_focus(), FocusTarget::Search);

        router.release(scope);
        assert!(!router.is_listening(ModalKind::Reader));
        assert_eq!(router.focus(), FocusTarget::Search);
    }

    #[test]
    fn test_release_only_removes_own_listener() {
        let mut router = InputRouter::new();
        let lightbox = router.acquire(ModalKind::Lightbox, FocusTarget::LightboxStage);
        let details = router.acquire(ModalKind::Details, FocusTarget::Details);

        router.release(lightbox);
        assert_eq!(router.listeners(), vec![ModalKind::Details]);
        router.release(details);
        assert!(router.listeners().is_empty());
    }

    #[test]
    fn test_key_names() {
        assert_eq!("Escape".parse::<Key>().unwrap(), Key::Escape);
        assert_eq!("Shift+Tab".parse::<Key>().unwrap(), Key::BackTab);
        assert_eq!("+".parse::<Key>().unwrap(), Key::Char('+'));
        assert!("PageDown".parse::<Key>().is_err());
    }
}
