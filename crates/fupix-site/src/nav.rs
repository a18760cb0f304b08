#![forbid(unsafe_code)]

//! Navbar auto-hide and active-link tracking.

/// Scroll offset below which the navbar never hides.
pub const NAV_HIDE_OFFSET: f32 = 50.0;

/// Auto-hide state of the fixed navbar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NavbarState {
    last_scroll_top: f32,
    hidden: bool,
}

impl NavbarState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Feed the container's new `scrollTop`. Hides when moving down past
    /// [`NAV_HIDE_OFFSET`], shows otherwise. Returns the new visibility
    /// (`true` = hidden) when it changed.
    pub fn on_scroll(&mut self, scroll_top: f32) -> Option<bool> {
        let hide = scroll_top > self.last_scroll_top && scroll_top > NAV_HIDE_OFFSET;
        self.last_scroll_top = scroll_top;
        if hide == self.hidden {
            return None;
        }
        self.hidden = hide;
        Some(hide)
    }
}

/// Which navigation link is highlighted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSection {
    active: Option<String>,
}

impl ActiveSection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// A section crossed the highlight threshold. Leaving sections are
    /// ignored; the last one to enter stays active. Returns the section id
    /// when the highlight moved.
    pub fn on_intersection(&mut self, section_id: &str, intersecting: bool) -> Option<&str> {
        if !intersecting || self.active.as_deref() == Some(section_id) {
            return None;
        }
        self.active = Some(section_id.to_string());
        self.active.as_deref()
    }

    /// The `href` of the link that should be highlighted.
    #[must_use]
    pub fn active_href(&self) -> Option<String> {
        self.active.as_ref().map(|id| format!("#{id}"))
    }
}
