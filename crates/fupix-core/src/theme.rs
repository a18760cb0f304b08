#![forbid(unsafe_code)]

//! Light/dark theme state and the colours derived from it.
//!
//! [`ThemeStore`] owns the current [`Theme`], persists it through a
//! [`ThemeStorage`] backend, and queues a [`ThemeChange`] whenever the value
//! actually changes. Consumers (the particle swarm, decorative canvases)
//! drain the queue instead of registering callbacks, and resolve colours
//! through [`ThemePalette`] rather than reading global state.
//!
//! # Invariants
//!
//! 1. A change event is queued only when the theme value changes.
//! 2. Every `set` is persisted, even when it does not change the value.
//! 3. An unreadable stored value is ignored (treated as absent).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage key for the persisted preference.
pub const THEME_STORAGE_KEY: &str = "nexus-gaming-theme";

/// Page colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// The `data-theme` attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Interpret a `data-theme` attribute. Anything but `light` is dark.
    #[must_use]
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("light") => Self::Light,
            _ => Self::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored theme string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeParseError(pub String);

impl fmt::Display for ThemeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown theme: {:?}", self.0)
    }
}

impl std::error::Error for ThemeParseError {}

impl FromStr for Theme {
    type Err = ThemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(ThemeParseError(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Colours
// ---------------------------------------------------------------------------

/// An opaque RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From a `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Attach an alpha value (clamped to `[0, 1]`).
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba {
            rgb: self,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// CSS `rgb(r, g, b)` notation.
    #[must_use]
    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// An RGB colour with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f32,
}

impl Rgba {
    /// CSS `rgba(r, g, b, a)` notation with three alpha decimals.
    #[must_use]
    pub fn to_css(self) -> String {
        format!(
            "rgba({}, {}, {}, {:.3})",
            self.rgb.r, self.rgb.g, self.rgb.b, self.alpha
        )
    }
}

/// Colours resolved for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    /// Particle, node and line colour.
    pub accent: Rgb,
    /// 3D grid line colour.
    pub grid: Rgb,
    /// Backdrop clear colour (also the fog colour).
    pub background: Rgb,
}

impl ThemePalette {
    pub const DARK: Self = Self {
        accent: Rgb::new(0, 248, 248),
        grid: Rgb::from_hex(0x666666),
        background: Rgb::from_hex(0x000000),
    };

    pub const LIGHT: Self = Self {
        accent: Rgb::new(0, 124, 124),
        grid: Rgb::from_hex(0xAAAAAA),
        background: Rgb::from_hex(0xEEEEEE),
    };

    #[must_use]
    pub const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::DARK,
            Theme::Light => Self::LIGHT,
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Key/value persistence used by [`ThemeStore`] (`localStorage` on the web).
pub trait ThemeStorage {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str);
}

/// In-memory storage, used natively and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an entry (builder).
    #[must_use]
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl ThemeStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

/// Notification that the theme changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeChange {
    pub from: Theme,
    pub to: Theme,
}

/// Current theme plus persistence and change notifications.
#[derive(Debug)]
pub struct ThemeStore<S> {
    storage: S,
    theme: Theme,
    changes: Vec<ThemeChange>,
}

impl<S: ThemeStorage> ThemeStore<S> {
    /// Load the persisted theme, falling back to the system preference.
    pub fn load(storage: S, prefers_dark: bool) -> Self {
        let theme = match Self::stored(&storage) {
            Some(theme) => theme,
            None if prefers_dark => Theme::Dark,
            None => Theme::Light,
        };
        Self {
            storage,
            theme,
            changes: Vec::new(),
        }
    }

    fn stored(storage: &S) -> Option<Theme> {
        let raw = storage.load(THEME_STORAGE_KEY)?;
        match raw.parse() {
            Ok(theme) => Some(theme),
            Err(_err) => {
                crate::warn!(error = %_err, "ignoring stored theme");
                None
            }
        }
    }

    /// Current theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Colours for the current theme.
    #[must_use]
    pub fn palette(&self) -> ThemePalette {
        ThemePalette::for_theme(self.theme)
    }

    /// Whether a preference has been persisted.
    #[must_use]
    pub fn has_stored_preference(&self) -> bool {
        Self::stored(&self.storage).is_some()
    }

    /// Set and persist the theme; queues a change if the value differs.
    pub fn set(&mut self, theme: Theme) {
        self.storage.save(THEME_STORAGE_KEY, theme.as_str());
        if theme != self.theme {
            crate::info!(from = %self.theme, to = %theme, "theme changed");
            self.changes.push(ThemeChange {
                from: self.theme,
                to: theme,
            });
            self.theme = theme;
        }
    }

    /// Flip between light and dark. Returns the new theme.
    pub fn toggle(&mut self) -> Theme {
        let next = self.theme.toggled();
        self.set(next);
        next
    }

    /// Follow a system colour-scheme change unless the user chose explicitly.
    pub fn system_preference_changed(&mut self, prefers_dark: bool) {
        if self.has_stored_preference() {
            return;
        }
        let theme = if prefers_dark { Theme::Dark } else { Theme::Light };
        if theme != self.theme {
            self.changes.push(ThemeChange {
                from: self.theme,
                to: theme,
            });
            self.theme = theme;
        }
    }

    /// Take all queued change notifications.
    pub fn drain_changes(&mut self) -> impl Iterator<Item = ThemeChange> + '_ {
        self.changes.drain(..)
    }

    /// Borrow the storage backend.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        assert_eq!("light".parse::<Theme>(), Ok(Theme::Light));
        assert_eq!(" dark ".parse::<Theme>(), Ok(Theme::Dark));
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.to_string(), "light");
    }

    #[test]
    fn attribute_defaults_to_dark() {
        assert_eq!(Theme::from_attribute(None), Theme::Dark);
        assert_eq!(Theme::from_attribute(Some("")), Theme::Dark);
        assert_eq!(Theme::from_attribute(Some("light")), Theme::Light);
    }

    #[test]
    fn accent_colours() {
        assert_eq!(ThemePalette::for_theme(Theme::Dark).accent, Rgb::new(0, 248, 248));
        assert_eq!(ThemePalette::for_theme(Theme::Light).accent, Rgb::new(0, 124, 124));
        assert_eq!(ThemePalette::LIGHT.background, Rgb::new(0xEE, 0xEE, 0xEE));
    }

    #[test]
    fn css_formatting() {
        let c = Rgb::new(0, 248, 248).with_alpha(0.5);
        assert_eq!(c.to_css(), "rgba(0, 248, 248, 0.500)");
        assert_eq!(Rgb::new(1, 2, 3).with_alpha(7.0).alpha, 1.0);
        assert_eq!(Rgb::from_hex(0x102030).to_css(), "rgb(16, 32, 48)");
    }

    #[test]
    fn stored_preference_wins() {
        let storage = MemoryStorage::new().with_entry(THEME_STORAGE_KEY, "light");
        let store = ThemeStore::load(storage, true);
        assert_eq!(store.theme(), Theme::Light);
    }

    #[test]
    fn falls_back_to_system_preference() {
        assert_eq!(ThemeStore::load(MemoryStorage::new(), true).theme(), Theme::Dark);
        assert_eq!(ThemeStore::load(MemoryStorage::new(), false).theme(), Theme::Light);
    }

    #[test]
    fn garbage_stored_value_is_ignored() {
        let storage = MemoryStorage::new().with_entry(THEME_STORAGE_KEY, "neon");
        let store = ThemeStore::load(storage, false);
        assert_eq!(store.theme(), Theme::Light);
        assert!(!store.has_stored_preference());
    }

    #[test]
    fn toggle_persists_and_notifies() {
        let mut store = ThemeStore::load(MemoryStorage::new(), true);
        assert_eq!(store.toggle(), Theme::Light);
        assert_eq!(
            store.storage().load(THEME_STORAGE_KEY).as_deref(),
            Some("light")
        );
        let changes: Vec<_> = store.drain_changes().collect();
        assert_eq!(
            changes,
            vec![ThemeChange {
                from: Theme::Dark,
                to: Theme::Light
            }]
        );
        assert_eq!(store.drain_changes().count(), 0);
    }

    #[test]
    fn setting_same_theme_is_silent() {
        let mut store = ThemeStore::load(MemoryStorage::new(), true);
        store.set(Theme::Dark);
        assert_eq!(store.drain_changes().count(), 0);
        assert!(store.has_stored_preference());
    }

    #[test]
    fn system_change_ignored_after_explicit_choice() {
        let mut store = ThemeStore::load(MemoryStorage::new(), true);
        store.system_preference_changed(false);
        assert_eq!(store.theme(), Theme::Light);
        store.set(Theme::Dark);
        store.system_preference_changed(false);
        assert_eq!(store.theme(), Theme::Dark);
    }
}
