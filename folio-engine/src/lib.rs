//! # Folio Engine
//!
//! Client-side behaviour of a single-page portfolio site, kept free of any
//! real page. The content document is rendered once into a card table;
//! from then on filters flip card visibility, and the controllers (audio
//! playlist, lightbox, post reader, project details) react to gestures
//! routed through a [`Session`].
//!
//! Presentation layers render from [`SessionView`] and feed gestures back
//! through the session's methods. The `folio-engine` binary drives a session
//! from a command script and prints snapshots as JSON.

pub mod audio;
pub mod debounce;
pub mod details;
pub mod error;
pub mod filter;
pub mod lightbox;
pub mod loader;
pub mod modal;
pub mod playlist;
pub mod reader;
pub mod registry;
pub mod render;
pub mod sanitize;
pub mod script;
pub mod session;
pub mod theme;
pub mod toast;
pub mod view;

pub use audio::{AudioBackend, SimulatedAudio};
pub use error::{Error, Result};
pub use filter::{FilterEngine, FilterState};
pub use modal::{FocusTarget, InputRouter, Key, LightboxControl, ModalKind};
pub use registry::{Card, CardId, CardRegistry, SectionKey, SectionKind};
pub use script::{parse_line, Command, ScriptRunner};
pub use session::{Session, SessionOptions};
pub use view::SessionView;
