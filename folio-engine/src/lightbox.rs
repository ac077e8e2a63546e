//! Lightbox controller
//!
//! Modal viewer over every gallery image on the page, in page order,
//! regardless of filtering. State is `closed` or `open(index)`; zoom is a
//! separate two-state toggle that resets to fit on every open.

use crate::modal::{FocusTarget, InputRouter, Key, LightboxControl, ModalKind, ModalScope};
use serde::Serialize;
use tracing::debug;

/// Horizontal travel a swipe must exceed
pub const SWIPE_MIN_DX: f64 = 40.0;

/// Vertical drift a swipe must stay under
pub const SWIPE_MAX_DY: f64 = 60.0;

/// One viewable image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightboxItem {
    /// Largest available rendition
    pub src: String,
    pub alt: String,
    pub title: String,
    pub year: String,
    /// Last path segment of `src`
    pub filename: String,
}

impl LightboxItem {
    /// "title · year · filename", skipping empty parts after the title
    pub fn caption(&self) -> String {
        let mut caption = self.title.clone();
        for part in [&self.year, &self.filename] {
            if !part.is_empty() {
                caption.push_str(" · ");
                caption.push_str(part);
            }
        }
        caption.trim().to_string()
    }

    /// Suggested download name
    pub fn download_name(&self) -> &str {
        if self.filename.is_empty() {
            "image"
        } else {
            &self.filename
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Zoom {
    Fit,
    Actual,
}

impl Zoom {
    /// Label of the zoom button, naming the state it switches to
    pub fn button_label(&self) -> &'static str {
        match self {
            Zoom::Fit => "1:1",
            Zoom::Actual => "Fit",
        }
    }
}

#[derive(Debug)]
pub struct Lightbox {
    items: Vec<LightboxItem>,
    index: usize,
    zoom: Zoom,
    scope: Option<ModalScope>,
    touch_start: Option<(f64, f64)>,
}

impl Lightbox {
    pub fn new(items: Vec<LightboxItem>) -> Self {
        Self {
            items,
            index: 0,
            zoom: Zoom::Fit,
            scope: None,
            touch_start: None,
        }
    }

    pub fn items(&self) -> &[LightboxItem] {
        &self.items
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn is_open(&self) -> bool {
        self.scope.is_some()
    }

    pub fn current(&self) -> Option<&LightboxItem> {
        self.items.get(self.index)
    }

    /// Show item `index`, opening the modal if needed
    ///
    /// Focus moves to the zoom button. The focus captured on the first open
    /// is kept across navigation so closing returns to the original element.
    pub fn open(&mut self, index: usize, router: &mut InputRouter) {
        if index >= self.items.len() {
            debug!("Lightbox item {} does not exist", index);
            return;
        }
        self.index = index;
        self.zoom = Zoom::Fit;
        let focus = FocusTarget::Lightbox {
            control: LightboxControl::Zoom,
        };
        match self.scope {
            Some(_) => router.set_focus(focus),
            None => self.scope = Some(router.acquire(ModalKind::Lightbox, focus)),
        }
    }

    pub fn close(&mut self, router: &mut InputRouter) {
        if let Some(scope) = self.scope.take() {
            router.release(scope);
        }
        self.touch_start = None;
    }

    /// Move circularly by `delta` and re-open
    pub fn show(&mut self, delta: isize, router: &mut InputRouter) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let next = (self.index as isize + delta).rem_euclid(len as isize) as usize;
        self.open(next, router);
    }

    pub fn set_zoom(&mut self, zoom: Zoom, router: &mut InputRouter) {
        self.zoom = zoom;
        router.set_focus(FocusTarget::LightboxStage);
    }

    pub fn toggle_zoom(&mut self, router: &mut InputRouter) {
        let next = match self.zoom {
            Zoom::Fit => Zoom::Actual,
            Zoom::Actual => Zoom::Fit,
        };
        self.set_zoom(next, router);
    }

    /// Global key listener; ignored while closed
    pub fn handle_key(&mut self, key: Key, router: &mut InputRouter) -> bool {
        if !self.is_open() {
            return false;
        }
        match key {
            Key::Escape => self.close(router),
            Key::ArrowLeft => self.show(-1, router),
            Key::ArrowRight => self.show(1, router),
            Key::Char('+') | Key::Char('=') => self.set_zoom(Zoom::Actual, router),
            Key::Char('-') | Key::Char('_') => self.set_zoom(Zoom::Fit, router),
            Key::Tab => self.cycle_focus(1, router),
            Key::BackTab => self.cycle_focus(-1, router),
            _ => return false,
        }
        true
    }

    /// Activate one of the modal's buttons
    pub fn press(&mut self, control: LightboxControl, router: &mut InputRouter) {
        if !self.is_open() {
            return;
        }
        match control {
            LightboxControl::Zoom => self.toggle_zoom(router),
            LightboxControl::Prev => self.show(-1, router),
            LightboxControl::Next => self.show(1, router),
            LightboxControl::Close => self.close(router),
            LightboxControl::Download => {}
        }
    }

    pub fn touch_start(&mut self, x: f64, y: f64) {
        self.touch_start = Some((x, y));
    }

    pub fn touch_end(&mut self, x: f64, y: f64, router: &mut InputRouter) {
        if let Some((sx, sy)) = self.touch_start.take() {
            self.swipe(x - sx, y - sy, router);
        }
    }

    /// A wide, flat gesture navigates; rightward goes back
    pub fn swipe(&mut self, dx: f64, dy: f64, router: &mut InputRouter) {
        if !self.is_open() || dx.abs() <= SWIPE_MIN_DX || dy.abs() >= SWIPE_MAX_DY {
            return;
        }
        if dx > 0.0 {
            self.show(-1, router);
        } else {
            self.show(1, router);
        }
    }

    /// Tab trap over the modal's own controls, wrapping at both ends
    fn cycle_focus(&mut self, dir: isize, router: &mut InputRouter) {
        let order = LightboxControl::TRAP_ORDER;
        let current = match router.focus() {
            FocusTarget::Lightbox { control } => order
                .iter()
                .position(|c| *c == control)
                .map(|p| p as isize)
                .unwrap_or(-1),
            _ => -1,
        };
        let len = order.len() as isize;
        let next = (current + dir + len).rem_euclid(len) as usize;
        router.set_focus(FocusTarget::Lightbox {
            control: order[next],
        });
    }
}
