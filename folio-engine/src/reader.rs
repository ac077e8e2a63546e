//! Reader controller
//!
//! Paginates over one section's posts in authoring order (filters do not
//! apply) and remembers a scroll offset per `section:index` for the rest of
//! the session. Every navigation or close records the current offset first.

use crate::modal::{FocusTarget, InputRouter, Key, ModalKind, ModalScope};
use crate::registry::SectionKey;
use crate::sanitize::sanitize_html;
use folio_common::content::{non_empty, Post};
use std::collections::HashMap;
use tracing::debug;

/// Key of one item's remembered scroll offset
pub fn scroll_key(section: SectionKey, index: usize) -> String {
    format!("{}:{}", section, index)
}

#[derive(Debug, Default)]
pub struct Reader {
    section: Option<SectionKey>,
    items: Vec<Post>,
    index: usize,
    /// Sanitized body of the current item
    body_html: String,
    scroll_top: f64,
    scroll: HashMap<String, f64>,
    scope: Option<ModalScope>,
}

impl Reader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.scope.is_some()
    }

    pub fn section(&self) -> Option<SectionKey> {
        self.section
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Post> {
        self.items.get(self.index)
    }

    pub fn title(&self) -> &str {
        self.current().and_then(|p| non_empty(&p.title)).unwrap_or("")
    }

    pub fn body_html(&self) -> &str {
        &self.body_html
    }

    /// Scroll offset of the reader body
    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    /// Remembered offset for an item, if any
    pub fn remembered(&self, section: SectionKey, index: usize) -> Option<f64> {
        self.scroll.get(&scroll_key(section, index)).copied()
    }

    /// Open on `index` of a section's full post list
    pub fn open(
        &mut self,
        section: SectionKey,
        items: Vec<Post>,
        index: usize,
        router: &mut InputRouter,
    ) {
        if items.is_empty() {
            debug!("Reader not opened: {} has no posts", section);
            return;
        }
        if self.is_open() {
            self.save_scroll();
        }
        self.section = Some(section);
        self.items = items;
        self.show(index as isize);
        if self.scope.is_none() {
            self.scope = Some(router.acquire(ModalKind::Reader, FocusTarget::Reader));
        }
    }

    /// Render an item, normalizing the index circularly
    pub fn show(&mut self, index: isize) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        self.index = index.rem_euclid(len as isize) as usize;
        let html = self.current().and_then(|p| p.html.clone()).unwrap_or_default();
        self.body_html = sanitize_html(&html);
        self.scroll_top = match self.section {
            Some(section) => self.remembered(section, self.index).unwrap_or(0.0),
            None => 0.0,
        };
    }

    pub fn next(&mut self) {
        self.save_scroll();
        self.show(self.index as isize + 1);
    }

    pub fn previous(&mut self) {
        self.save_scroll();
        self.show(self.index as isize - 1);
    }

    /// User scrolled the body
    pub fn scroll_to(&mut self, offset: f64) {
        if self.is_open() {
            self.scroll_top = offset.max(0.0);
        }
    }

    pub fn close(&mut self, router: &mut InputRouter) {
        if let Some(scope) = self.scope.take() {
            self.save_scroll();
            router.release(scope);
        }
    }

    /// Global key listener; ignored while closed
    pub fn handle_key(&mut self, key: Key, router: &mut InputRouter) -> bool {
        if !self.is_open() {
            return false;
        }
        match key {
            Key::Escape => self.close(router),
            Key::ArrowLeft => self.previous(),
            Key::ArrowRight => self.next(),
            _ => return false,
        }
        true
    }

    fn save_scroll(&mut self) {
        if let Some(section) = self.section {
            self.scroll
                .insert(scroll_key(section, self.index), self.scroll_top);
        }
    }
}
