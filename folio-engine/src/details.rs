//! Details carousel
//!
//! Opens on one project and navigates only among the projects of that
//! section that were visible when it opened. The visible list is captured
//! once; filter changes while open do not reshape it. When nothing is
//! visible the requested project is shown alone with navigation frozen.

use crate::modal::{FocusTarget, InputRouter, Key, ModalKind, ModalScope};
use crate::registry::SectionKey;
use crate::render::{embed_view, EmbedView, LinkView};
use folio_common::content::{non_empty, year_string, Project};
use serde::Serialize;
use tracing::debug;

/// What the modal body shows for the current project
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetails {
    pub item: usize,
    pub title: String,
    pub year: String,
    pub summary: String,
    pub image: String,
    pub embed: Option<EmbedView>,
    pub links: Vec<LinkView>,
}

#[derive(Debug, Default)]
pub struct DetailsCarousel {
    section: Option<SectionKey>,
    items: Vec<Project>,
    /// Item indices navigable from this open
    list: Vec<usize>,
    pos: usize,
    frozen: bool,
    scope: Option<ModalScope>,
}

impl DetailsCarousel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.scope.is_some()
    }

    pub fn section(&self) -> Option<SectionKey> {
        self.section
    }

    /// Navigation disabled because nothing was visible at open
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn visible_list(&self) -> &[usize] {
        &self.list
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Item index of the project on screen
    pub fn current_item(&self) -> Option<usize> {
        self.list.get(self.pos).copied()
    }

    pub fn current(&self) -> Option<&Project> {
        self.current_item().and_then(|i| self.items.get(i))
    }

    /// Open on `start` with the section's currently visible item indices
    pub fn open(
        &mut self,
        section: SectionKey,
        items: Vec<Project>,
        start: usize,
        visible: Vec<usize>,
        router: &mut InputRouter,
    ) {
        if start >= items.len() {
            debug!("Details for {} item {} not opened: no such project", section, start);
            return;
        }
        self.frozen = visible.is_empty();
        self.list = if self.frozen { vec![start] } else { visible };
        self.pos = self.list.iter().position(|i| *i == start).unwrap_or(0);
        self.section = Some(section);
        self.items = items;

        if self.scope.is_none() {
            self.scope = Some(router.acquire(ModalKind::Details, FocusTarget::Details));
        }
        debug!(
            "Details opened on {} item {:?} ({} navigable)",
            section,
            self.current_item(),
            self.list.len()
        );
    }

    /// Move circularly within the captured list
    pub fn step(&mut self, delta: isize) {
        if self.frozen || self.list.is_empty() {
            return;
        }
        let len = self.list.len() as isize;
        self.pos = (self.pos as isize + delta).rem_euclid(len) as usize;
    }

    /// Close button, backdrop click and Escape all end here
    pub fn close(&mut self, router: &mut InputRouter) {
        if let Some(scope) = self.scope.take() {
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
            Key::ArrowLeft => self.step(-1),
            Key::ArrowRight => self.step(1),
            _ => return false,
        }
        true
    }

    pub fn details(&self) -> Option<ProjectDetails> {
        let item = self.current_item()?;
        let project = self.items.get(item)?;
        let title = non_empty(&project.title).unwrap_or("");
        Some(ProjectDetails {
            item,
            title: title.to_string(),
            year: year_string(&project.year),
            summary: project.summary.clone().unwrap_or_default(),
            image: project.thumb.clone().unwrap_or_default(),
            embed: project.embed.as_ref().and_then(|e| embed_view(e, title)),
            links: project.links.iter().map(LinkView::from).collect(),
        })
    }
}
