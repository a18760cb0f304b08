#![forbid(unsafe_code)]

//! Perspective grid tunnel.
//!
//! Four square grids (floor, ceiling and two walls) slide toward a fixed
//! perspective camera and wrap every world unit, so the motion loops
//! seamlessly. Lines are projected to the 2D surface and faded with
//! exponential-squared fog toward the background colour.
//!
//! # Invariants
//!
//! - The drift offset stays in `[0, 1)`.
//! - Geometry behind the near plane is clipped, never projected.
//! - The visible-section counter never goes below zero.

use fupix_core::geometry::{Size, Vec2};
use fupix_core::theme::{Theme, ThemePalette};

use crate::config::GridboxConfig;
use crate::surface::Surface;

const GRID_LINE_WIDTH: f32 = 1.0;

/// A point in camera-aligned world space (y up, camera looks toward -z).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }
}

/// Which surface of the tunnel a grid forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridPlane {
    Floor,
    Ceiling,
    LeftWall,
    RightWall,
}

impl GridPlane {
    pub const ALL: [GridPlane; 4] = [
        Self::Floor,
        Self::Ceiling,
        Self::LeftWall,
        Self::RightWall,
    ];

    /// World point at `lateral` across the plane and `depth` along z.
    fn point(self, offset: f32, lateral: f32, depth: f32) -> Vec3 {
        match self {
            Self::Floor => Vec3::new(lateral, -offset, depth),
            Self::Ceiling => Vec3::new(lateral, offset, depth),
            Self::LeftWall => Vec3::new(-offset, lateral, depth),
            Self::RightWall => Vec3::new(offset, lateral, depth),
        }
    }
}

/// A projected, fog-shaded line ready to stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSegment {
    pub from: Vec2,
    pub to: Vec2,
    /// Fog visibility in `[0, 1]`.
    pub alpha: f32,
}

/// The grid backdrop.
#[derive(Debug, Clone)]
pub struct GridBackdrop {
    config: GridboxConfig,
    viewport: Size,
    drift: f32,
    palette: ThemePalette,
    visible_sections: usize,
}

impl GridBackdrop {
    #[must_use]
    pub fn new(config: GridboxConfig, viewport: Size, theme: Theme) -> Self {
        Self {
            config,
            viewport,
            drift: 0.0,
            palette: ThemePalette::for_theme(theme),
            visible_sections: 0,
        }
    }

    #[must_use]
    pub fn drift(&self) -> f32 {
        self.drift
    }

    #[must_use]
    pub fn palette(&self) -> ThemePalette {
        self.palette
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.palette = ThemePalette::for_theme(theme);
    }

    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Record an observed section entering or leaving the viewport.
    /// Returns the new visibility when it flips.
    pub fn observe_section(&mut self, intersecting: bool) -> Option<bool> {
        let was = self.is_visible();
        if intersecting {
            self.visible_sections += 1;
        } else {
            self.visible_sections = self.visible_sections.saturating_sub(1);
        }
        let now = self.is_visible();
        (was != now).then_some(now)
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible_sections > 0
    }

    /// Slide the grids one frame toward the camera.
    pub fn step(&mut self) {
        self.drift += self.config.drift_per_frame;
        if self.drift >= 1.0 {
            self.drift = 0.0;
        }
    }

    /// Project a world point, or `None` when it is behind the near plane.
    #[must_use]
    pub fn project(&self, p: Vec3) -> Option<Vec2> {
        let depth = self.config.camera_z - p.z;
        if depth < self.config.near || self.viewport.is_empty() {
            return None;
        }
        let focal = 1.0 / (self.config.fov_degrees.to_radians() / 2.0).tan();
        let aspect = self.viewport.width / self.viewport.height;
        let ndc_x = p.x * focal / aspect / depth;
        let ndc_y = p.y * focal / depth;
        Some(Vec2::new(
            (ndc_x + 1.0) * 0.5 * self.viewport.width,
            (1.0 - ndc_y) * 0.5 * self.viewport.height,
        ))
    }

    /// Fog visibility at camera distance `depth`.
    #[must_use]
    pub fn fog_alpha(&self, depth: f32) -> f32 {
        let f = self.config.fog_density * depth;
        (-(f * f)).exp()
    }

    /// All visible line pieces for the current frame.
    #[must_use]
    pub fn segments(&self) -> Vec<GridSegment> {
        let half = f32::from(self.config.grid_size) / 2.0;
        let lines = self.config.grid_size as i32;
        let near_z = self.config.camera_z - self.config.near;
        let offset = self.config.plane_offset;
        let mut out = Vec::new();

        for plane in GridPlane::ALL {
            for k in 0..=lines {
                let along = -half + k as f32;

                // Across the tunnel at a fixed depth.
                let z = along + self.drift;
                if z <= near_z {
                    self.push_segment(
                        &mut out,
                        plane.point(offset, -half, z),
                        plane.point(offset, half, z),
                    );
                }

                // Along the tunnel, split so fog can vary with depth.
                let start = -half + self.drift;
                let end = (half + self.drift).min(near_z);
                let mut z0 = start;
                while z0 < end {
                    let z1 = (z0 + self.config.depth_piece).min(end);
                    if z1 <= z0 {
                        // Piece too small to advance z; unvalidated config.
                        break;
                    }
                    self.push_segment(
                        &mut out,
                        plane.point(offset, along, z0),
                        plane.point(offset, along, z1),
                    );
                    z0 = z1;
                }
            }
        }
        out
    }

    fn push_segment(&self, out: &mut Vec<GridSegment>, a: Vec3, b: Vec3) {
        let (Some(from), Some(to)) = (self.project(a), self.project(b)) else {
            return;
        };
        let mid = a.lerp(b, 0.5);
        out.push(GridSegment {
            from,
            to,
            alpha: self.fog_alpha(self.config.camera_z - mid.z),
        });
    }

    /// Clear to the background and stroke every segment.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) -> usize {
        surface.fill_background(self.palette.background);
        let segments = self.segments();
        for seg in &segments {
            surface.stroke_line(
                seg.from,
                seg.to,
                GRID_LINE_WIDTH,
                self.palette.grid.with_alpha(seg.alpha),
            );
        }
        segments.len()
    }

    /// One animation frame.
    pub fn frame<S: Surface + ?Sized>(&mut self, surface: &mut S) -> usize {
        self.step();
        self.render(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, RecordingSurface};

    fn backdrop() -> GridBackdrop {
        GridBackdrop::new(GridboxConfig::default(), Size::new(800.0, 600.0), Theme::Dark)
    }

    #[test]
    fn drift_wraps_at_one() {
        let mut g = backdrop();
        for _ in 0..1000 {
            g.step();
            assert!((0.0..1.0).contains(&g.drift()));
        }
    }

    #[test]
    fn axis_projects_to_centre() {
        let g = backdrop();
        let p = g.project(Vec3::new(0.0, 0.0, -10.0)).unwrap();
        assert!((p.x - 400.0).abs() < 1e-3);
        assert!((p.y - 300.0).abs() < 1e-3);
        assert!(g.project(Vec3::new(0.0, 0.0, 2.95)).is_none());
    }

    #[test]
    fn floor_is_below_horizon() {
        let g = backdrop();
        let p = g.project(Vec3::new(0.0, -1.5, -5.0)).unwrap();
        assert!(p.y > 300.0);
    }

    #[test]
    fn fog_fades_with_distance() {
        let g = backdrop();
        assert_eq!(g.fog_alpha(0.0), 1.0);
        assert!(g.fog_alpha(10.0) > g.fog_alpha(30.0));
        assert!(g.fog_alpha(30.0) > 0.0);
    }

    #[test]
    fn counter_never_negative() {
        let mut g = backdrop();
        assert_eq!(g.observe_section(false), None);
        assert_eq!(g.observe_section(true), Some(true));
        assert_eq!(g.observe_section(true), None);
        assert_eq!(g.observe_section(false), None);
        assert_eq!(g.observe_section(false), Some(false));
        assert_eq!(g.observe_section(false), None);
        assert!(!g.is_visible());
    }

    #[test]
    fn render_clears_with_theme_background() {
        let mut g = backdrop();
        g.set_theme(Theme::Light);
        let mut s = RecordingSurface::new(Size::new(800.0, 600.0));
        let drawn = g.render(&mut s);
        assert!(drawn > 0);
        assert_eq!(s.line_count(), drawn);
        match &s.ops()[0] {
            DrawOp::Rect { color, .. } => assert_eq!(color.rgb, ThemePalette::LIGHT.background),
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn empty_viewport_draws_nothing() {
        let g = GridBackdrop::new(GridboxConfig::default(), Size::default(), Theme::Dark);
        assert!(g.segments().is_empty());
    }

    #[test]
    fn stalled_depth_piece_terminates() {
        for depth_piece in [0.0, -1.0, f32::NAN, 1e-30] {
            let config = GridboxConfig {
                depth_piece,
                ..GridboxConfig::default()
            };
            let g = GridBackdrop::new(config, Size::new(800.0, 600.0), Theme::Dark);
            // Cross-tunnel lines still render; depth lines are skipped.
            assert!(!g.segments().is_empty());
        }
    }
}
