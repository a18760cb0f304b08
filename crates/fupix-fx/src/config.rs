#![forbid(unsafe_code)]

//! Effect configuration.
//!
//! Defaults reproduce the production tuning. Every struct deserializes from
//! a partial JSON object (missing fields keep their defaults), which is how
//! the web host forwards page-level overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FxError;

/// Tuning for the particle logo and its transition controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Headline text.
    pub text_main: String,
    /// Sub-label drawn below the headline.
    pub text_sub: String,
    /// CSS font family list for the headline.
    pub font_main: String,
    /// CSS font family list for the sub-label.
    pub font_sub: String,
    /// Headline font weight.
    pub weight_main: u16,
    /// Sub-label font weight.
    pub weight_sub: u16,
    /// Sampling stride in pixels (both axes).
    pub particle_gap: u32,
    /// A pixel is ink when its alpha exceeds this value.
    pub alpha_threshold: u8,
    /// Pixels between the anchor's right edge and the text's right edge.
    pub anchor_inset: f32,
    /// Halve the particle count when sampling yields more points than this.
    pub decimate_above: usize,
    /// Maximum distance (px) for a connection line.
    pub connection_distance: f32,
    /// How many subsequent particles each particle checks for connections.
    pub connection_lookahead: usize,
    /// Upper bound of the random per-particle activation delay.
    pub assemble_delay_ms: u64,
    /// When the logo marker appears.
    pub logo_delay_ms: u64,
    /// When assembling ends and gestures are accepted.
    pub ready_delay_ms: u64,
    /// Dispersal animation length before scrolling away.
    pub disperse_ms: u64,
    /// Grace period after the programmatic scroll to the next panel.
    pub settle_ms: u64,
    /// Head start given to the smooth scroll home before reassembly.
    pub return_scroll_ms: u64,
    /// Reassembly animation length.
    pub reassemble_ms: u64,
    /// Quiet period before a resize triggers resampling.
    pub resize_debounce_ms: u64,
    /// Panel that owns the logo.
    pub home_section: usize,
    /// Panel scrolled to after dispersal.
    pub next_section: usize,
    /// PRNG seed.
    pub seed: u64,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            text_main: "FUPIX".to_string(),
            text_sub: "SOLUTIONS".to_string(),
            font_main: "\"Orbitron\", \"Segoe UI\", sans-serif".to_string(),
            font_sub: "\"Rajdhani\", \"Segoe UI\", sans-serif".to_string(),
            weight_main: 900,
            weight_sub: 700,
            particle_gap: 3,
            alpha_threshold: 128,
            anchor_inset: 20.0,
            decimate_above: 5000,
            connection_distance: 22.0,
            connection_lookahead: 20,
            assemble_delay_ms: 1500,
            logo_delay_ms: 2000,
            ready_delay_ms: 3500,
            disperse_ms: 1500,
            settle_ms: 500,
            return_scroll_ms: 300,
            reassemble_ms: 1800,
            resize_debounce_ms: 300,
            home_section: 0,
            next_section: 1,
            seed: 0x5EED_F0F1,
        }
    }
}

impl SwarmConfig {
    /// Parse a (possibly partial) JSON options object.
    pub fn from_json(json: &str) -> Result<Self, FxError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    /// Reject option combinations the controller cannot run with.
    pub fn validate(self) -> Result<Self, FxError> {
        if self.particle_gap == 0 {
            return Err(FxError::Config("particle_gap must be at least 1".into()));
        }
        if self.home_section == self.next_section {
            return Err(FxError::Config(
                "home_section and next_section must differ".into(),
            ));
        }
        Ok(self)
    }

    /// Builder: replace the PRNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder: replace both text lines.
    #[must_use]
    pub fn with_text(mut self, main: impl Into<String>, sub: impl Into<String>) -> Self {
        self.text_main = main.into();
        self.text_sub = sub.into();
        self
    }

    pub fn assemble_delay(&self) -> Duration {
        Duration::from_millis(self.assemble_delay_ms)
    }

    pub fn logo_delay(&self) -> Duration {
        Duration::from_millis(self.logo_delay_ms)
    }

    pub fn ready_delay(&self) -> Duration {
        Duration::from_millis(self.ready_delay_ms)
    }

    pub fn disperse_duration(&self) -> Duration {
        Duration::from_millis(self.disperse_ms)
    }

    pub fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn return_scroll_duration(&self) -> Duration {
        Duration::from_millis(self.return_scroll_ms)
    }

    pub fn reassemble_duration(&self) -> Duration {
        Duration::from_millis(self.reassemble_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

/// Tuning for the plexus node network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlexusConfig {
    /// Square pixels per node when seeding.
    pub area_per_node: f32,
    /// Square pixels per node used to decide whether a resize reseeds.
    pub reseed_area_per_node: f32,
    /// Reseed when the expected count drifts by more than this.
    pub reseed_tolerance: usize,
    /// Minimum node count.
    pub min_nodes: usize,
    /// Maximum link distance (px); also capped at `(w + h) / 8`.
    pub max_link_distance: f32,
    /// Pointer repulsion radius (px).
    pub repel_radius: f32,
    /// Peak repulsion impulse.
    pub repel_strength: f32,
    /// Per-frame velocity damping.
    pub friction: f32,
    /// Maximum initial speed per axis.
    pub max_initial_speed: f32,
    /// Off-canvas margin before a node wraps.
    pub wrap_margin: f32,
    /// Glow blur radius for nodes and lines.
    pub glow_blur: f32,
    /// Links fainter than this are skipped.
    pub min_link_alpha: f32,
    pub seed: u64,
}

impl Default for PlexusConfig {
    fn default() -> Self {
        Self {
            area_per_node: 11_000.0,
            reseed_area_per_node: 12_000.0,
            reseed_tolerance: 20,
            min_nodes: 40,
            max_link_distance: 220.0,
            repel_radius: 180.0,
            repel_strength: 0.9,
            friction: 0.995,
            max_initial_speed: 0.2,
            wrap_margin: 10.0,
            glow_blur: 14.0,
            min_link_alpha: 0.05,
            seed: 0x91E_0005,
        }
    }
}

impl PlexusConfig {
    /// Parse a (possibly partial) JSON options object.
    pub fn from_json(json: &str) -> Result<Self, FxError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    /// Node areas must be positive.
    pub fn validate(self) -> Result<Self, FxError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.area_per_node) || !positive(self.reseed_area_per_node) {
            return Err(FxError::Config("node areas must be positive".into()));
        }
        Ok(self)
    }
}

/// Tuning for the perspective grid backdrop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridboxConfig {
    /// Grid extent in world units (lines every unit).
    pub grid_size: u16,
    /// Distance of floor/ceiling/walls from the axis.
    pub plane_offset: f32,
    /// World units the grids advance per frame.
    pub drift_per_frame: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Camera distance from the origin along +z.
    pub camera_z: f32,
    /// Near clipping distance.
    pub near: f32,
    /// Exponential-squared fog density.
    pub fog_density: f32,
    /// Length of the pieces depth lines are split into for fog shading.
    pub depth_piece: f32,
}

impl Default for GridboxConfig {
    fn default() -> Self {
        Self {
            grid_size: 60,
            plane_offset: 1.5,
            drift_per_frame: 0.005,
            fov_degrees: 75.0,
            camera_z: 3.0,
            near: 0.1,
            fog_density: 0.04,
            depth_piece: 5.0,
        }
    }
}

impl GridboxConfig {
    /// Parse a (possibly partial) JSON options object.
    pub fn from_json(json: &str) -> Result<Self, FxError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    /// Reject geometry the projection or the segment split cannot handle.
    pub fn validate(self) -> Result<Self, FxError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if self.grid_size == 0 {
            return Err(FxError::Config("grid_size must be at least 1".into()));
        }
        if !positive(self.depth_piece) || !positive(self.near) {
            return Err(FxError::Config(
                "depth_piece and near must be positive".into(),
            ));
        }
        if !(self.fov_degrees.is_finite() && self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(FxError::Config(
                "fov_degrees must lie strictly between 0 and 180".into(),
            ));
        }
        let finite = [
            self.plane_offset,
            self.drift_per_frame,
            self.camera_z,
            self.fog_density,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(FxError::Config("gridbox values must be finite".into()));
        }
        Ok(self)
    }
}
