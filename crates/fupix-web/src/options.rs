#![forbid(unsafe_code)]

//! Page options and DOM hooks.
//!
//! The page may pass a JSON object to the `FupixSite` constructor; every
//! section is optional and missing fields keep their defaults.

use fupix_fx::{FxError, GridboxConfig, PlexusConfig, SwarmConfig};
use fupix_site::{ContactConfig, RevealConfig};
use serde::{Deserialize, Serialize};

/// Element ids and selectors the frontend binds to.
pub mod dom {
    pub const PARTICLE_CANVAS: &str = "particleCanvas";
    pub const HOME_SECTION: &str = "home";
    pub const TEXT_ANCHOR: &str = fupix_fx::swarm::ANCHOR_ELEMENT_ID;
    pub const SCROLL_CONTAINER: &str = ".scroll-container";
    pub const SECTIONS: &str = "section";

    pub const PLEXUS_CANVAS: &str = "plexusCanvas";
    pub const PLEXUS_SECTION: &str = "detail";

    pub const GRIDBOX_CANVAS_CLASS: &str = "gridbox-canvas";
    pub const GRIDBOX_SECTIONS: &str = ".gridbox-section";

    pub const THEME_TOGGLE: &str = "theme-toggle";
    pub const THEME_ATTRIBUTE: &str = "data-theme";

    pub const NAVBAR: &str = ".navbar";
    pub const NAV_LINKS: &str = ".nav-links a";

    pub const ANIMATED: &str = "[data-animate]";
    pub const TRACKED_SECTIONS: &str = ".gridbox-section, #featured, #detail";
    pub const HONEYCOMB: &str = ".honeycomb-layout";

    pub const CONTACT_SECTION: &str = "contact";
    pub const CONTACT_FORM: &str = "contactForm";
    pub const CHAR_COUNT: &str = "charCount";
}

/// All tunables, grouped by component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteOptions {
    pub swarm: SwarmConfig,
    pub plexus: PlexusConfig,
    pub gridbox: GridboxConfig,
    pub reveal: RevealConfig,
    pub contact: ContactConfig,
}

impl SiteOptions {
    /// Parse and validate an options object.
    pub fn from_json(json: &str) -> Result<Self, FxError> {
        let mut options: Self = serde_json::from_str(json)?;
        options.swarm = options.swarm.validate()?;
        options.plexus = options.plexus.validate()?;
        options.gridbox = options.gridbox.validate()?;
        Ok(options)
    }

    /// Options from an optional JSON string; blank means defaults.
    pub fn from_optional_json(json: Option<&str>) -> Result<Self, FxError> {
        match json.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(json) => Self::from_json(json),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_options_keep_defaults() {
        let options =
            SiteOptions::from_json(r#"{"swarm":{"text_main":"HELLO"},"reveal":{"once":false}}"#)
                .expect("valid");
        assert_eq!(options.swarm.text_main, "HELLO");
        assert_eq!(options.swarm.particle_gap, 3);
        assert!(!options.reveal.once);
        assert_eq!(options.plexus, PlexusConfig::default());
    }

    #[test]
    fn invalid_nested_options_are_rejected() {
        let err = SiteOptions::from_json(r#"{"swarm":{"particle_gap":0}}"#).unwrap_err();
        assert!(matches!(err, FxError::Config(_)));
    }

    #[test]
    fn degenerate_gridbox_is_rejected() {
        for json in [
            r#"{"gridbox":{"depth_piece":0}}"#,
            r#"{"gridbox":{"near":-1}}"#,
            r#"{"gridbox":{"fov_degrees":0}}"#,
        ] {
            let err = SiteOptions::from_json(json).unwrap_err();
            assert!(matches!(err, FxError::Config(_)), "{json}: {err:?}");
        }
    }

    #[test]
    fn blank_means_defaults() {
        assert_eq!(
            SiteOptions::from_optional_json(Some("  ")).expect("defaults"),
            SiteOptions::default()
        );
    }
}
