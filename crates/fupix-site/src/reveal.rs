#![forbid(unsafe_code)]

//! Scroll-triggered reveal state.
//!
//! Tracks three things the page styles react to:
//!
//! - **Elements** (`[data-animate]`) become visible when they intersect the
//!   viewport. With `once` they are then unobserved; otherwise they hide
//!   again on exit.
//! - **Sections** carry a `data-section-state` of `entering`, `active` or
//!   `exiting`, derived from their intersection ratio and bounding box.
//! - **Connector groups** (honeycomb layouts) show their connectors once two
//!   of their items are visible.
//!
//! A body-level scrolling flag is raised on scroll and cleared after a
//! quiet period.
//!
//! # Invariants
//!
//! - A section state change is reported only when the state differs.
//! - With `once`, an element is revealed at most one time.
//! - Connectors, once shown, stay shown.

use std::time::Duration;

use fupix_core::timer::Debounce;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Observer tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Intersection ratio that counts as visible.
    pub threshold: f32,
    /// Observer root margin (CSS syntax).
    pub root_margin: String,
    /// Reveal each element only once.
    pub once: bool,
    /// Quiet period after the last scroll event before the scrolling flag drops.
    pub scroll_idle_ms: u64,
    /// Visible items needed before a group shows its connectors.
    pub connector_min_visible: usize,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.15,
            root_margin: "0px 0px -15% 0px".to_string(),
            once: true,
            scroll_idle_ms: 100,
            connector_min_visible: 2,
        }
    }
}

impl RevealConfig {
    #[must_use]
    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Position of a section relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionState {
    Entering,
    Active,
    Exiting,
}

impl SectionState {
    /// Value for the `data-section-state` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entering => "entering",
            Self::Active => "active",
            Self::Exiting => "exiting",
        }
    }

    /// State of a section before any intersection has been observed.
    #[must_use]
    pub fn initial(top: f32, bottom: f32, viewport_height: f32) -> Self {
        if top >= viewport_height {
            Self::Entering
        } else if bottom <= 0.0 {
            Self::Exiting
        } else {
            Self::Active
        }
    }
}

/// One intersection observation of a section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionSample {
    pub is_intersecting: bool,
    pub intersection_ratio: f32,
    pub top: f32,
    pub bottom: f32,
    pub viewport_height: f32,
}

impl SectionSample {
    /// Classify; `None` when a non-intersecting section straddles the
    /// viewport (the state is left unchanged).
    #[must_use]
    pub fn classify(&self) -> Option<SectionState> {
        let vh = self.viewport_height;
        if self.is_intersecting {
            let fully_visible = self.top >= 0.0 && self.bottom <= vh;
            if self.intersection_ratio > 0.5 || fully_visible {
                Some(SectionState::Active)
            } else if self.top > vh * 0.5 {
                Some(SectionState::Entering)
            } else {
                Some(SectionState::Exiting)
            }
        } else if self.top >= vh {
            Some(SectionState::Entering)
        } else if self.bottom <= 0.0 {
            Some(SectionState::Exiting)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(usize);

/// A change for the host to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealEvent {
    /// Add `is-visible`.
    Show(ElementId),
    /// Remove `is-visible`.
    Hide(ElementId),
    /// Stop observing this element.
    Unobserve(ElementId),
    /// Set `data-section-state`.
    Section(SectionId, SectionState),
    /// Add `connectors-visible` to the group.
    Connectors(GroupId),
    /// Add (`true`) or remove (`false`) the body `is-scrolling` class.
    Scrolling(bool),
}

#[derive(Debug, Clone)]
struct Element {
    group: Option<GroupId>,
    visible: bool,
    observed: bool,
}

/// Reveal bookkeeping for one page.
#[derive(Debug, Clone)]
pub struct ScrollReveal {
    config: RevealConfig,
    elements: Vec<Element>,
    sections: Vec<SectionState>,
    connectors: Vec<bool>,
    scrolling: bool,
    scroll_idle: Debounce<()>,
    events: Vec<RevealEvent>,
}

impl ScrollReveal {
    #[must_use]
    pub fn new(config: RevealConfig) -> Self {
        let idle = Duration::from_millis(config.scroll_idle_ms);
        Self {
            config,
            elements: Vec::new(),
            sections: Vec::new(),
            connectors: Vec::new(),
            scrolling: false,
            scroll_idle: Debounce::new(idle),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// Register a connector group.
    pub fn add_group(&mut self) -> GroupId {
        self.connectors.push(false);
        GroupId(self.connectors.len() - 1)
    }

    /// Register an animated element, optionally inside a group.
    pub fn add_element(&mut self, group: Option<GroupId>) -> ElementId {
        self.elements.push(Element {
            group,
            visible: false,
            observed: true,
        });
        ElementId(self.elements.len() - 1)
    }

    /// Register a tracked section with its initial state.
    pub fn add_section(&mut self, top: f32, bottom: f32, viewport_height: f32) -> SectionId {
        let state = SectionState::initial(top, bottom, viewport_height);
        self.sections.push(state);
        let id = SectionId(self.sections.len() - 1);
        self.events.push(RevealEvent::Section(id, state));
        id
    }

    #[must_use]
    pub fn is_visible(&self, id: ElementId) -> bool {
        self.elements.get(id.0).is_some_and(|e| e.visible)
    }

    #[must_use]
    pub fn is_observed(&self, id: ElementId) -> bool {
        self.elements.get(id.0).is_some_and(|e| e.observed)
    }

    #[must_use]
    pub fn section_state(&self, id: SectionId) -> Option<SectionState> {
        self.sections.get(id.0).copied()
    }

    #[must_use]
    pub fn connectors_visible(&self, id: GroupId) -> bool {
        self.connectors.get(id.0).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// An element's intersection changed.
    pub fn element_intersection(&mut self, id: ElementId, intersecting: bool) {
        let once = self.config.once;
        let Some(el) = self.elements.get_mut(id.0) else {
            return;
        };
        if !el.observed {
            return;
        }
        if intersecting {
            if !el.visible {
                el.visible = true;
                self.events.push(RevealEvent::Show(id));
            }
            let group = el.group;
            if once {
                el.observed = false;
                self.events.push(RevealEvent::Unobserve(id));
            }
            if let Some(group) = group {
                self.check_connectors(group);
            }
        } else if !once && el.visible {
            el.visible = false;
            self.events.push(RevealEvent::Hide(id));
        }
    }

    fn check_connectors(&mut self, group: GroupId) {
        if self.connectors_visible(group) {
            return;
        }
        let visible = self
            .elements
            .iter()
            .filter(|e| e.group == Some(group) && e.visible)
            .count();
        if visible >= self.config.connector_min_visible {
            if let Some(shown) = self.connectors.get_mut(group.0) {
                *shown = true;
                self.events.push(RevealEvent::Connectors(group));
            }
        }
    }

    /// A section's intersection changed.
    pub fn section_intersection(&mut self, id: SectionId, sample: &SectionSample) {
        let Some(next) = sample.classify() else {
            return;
        };
        if let Some(state) = self.sections.get_mut(id.0) {
            if *state != next {
                *state = next;
                self.events.push(RevealEvent::Section(id, next));
            }
        }
    }

    /// No intersection observer available: show everything.
    pub fn fallback(&mut self) {
        debug!("intersection observer unavailable; revealing everything");
        for i in 0..self.elements.len() {
            let el = &mut self.elements[i];
            el.observed = false;
            if !el.visible {
                el.visible = true;
                self.events.push(RevealEvent::Show(ElementId(i)));
            }
        }
        for i in 0..self.sections.len() {
            if self.sections[i] != SectionState::Active {
                self.sections[i] = SectionState::Active;
                self.events
                    .push(RevealEvent::Section(SectionId(i), SectionState::Active));
            }
        }
        for i in 0..self.connectors.len() {
            if !self.connectors[i] {
                self.connectors[i] = true;
                self.events.push(RevealEvent::Connectors(GroupId(i)));
            }
        }
    }

    /// The scroll container scrolled.
    pub fn on_scroll(&mut self, now: Duration) {
        if !self.scrolling {
            self.scrolling = true;
            self.events.push(RevealEvent::Scrolling(true));
        }
        self.scroll_idle.push(now, ());
    }

    /// Clear the scrolling flag once scrolling has been idle long enough.
    pub fn tick(&mut self, now: Duration) {
        if self.scroll_idle.poll(now).is_some() && self.scrolling {
            self.scrolling = false;
            self.events.push(RevealEvent::Scrolling(false));
        }
    }

    /// When [`tick`](Self::tick) next has work.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scroll_idle.deadline()
    }

    /// Drain queued changes in order.
    pub fn drain_events(&mut self) -> Vec<RevealEvent> {
        std::mem::take(&mut self.events)
    }
}
