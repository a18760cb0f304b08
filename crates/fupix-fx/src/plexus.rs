#![forbid(unsafe_code)]

//! Plexus: drifting nodes joined by flickering proximity lines.
//!
//! Nodes drift, wrap around the edges and are pushed away from the
//! pointer. Every pair closer than the link distance is joined by a line
//! whose alpha combines distance falloff with a shared flicker.
//!
//! # Invariants
//!
//! - The field never holds fewer than `min_nodes` nodes once seeded.
//! - Links fainter than `min_link_alpha` are not drawn.

use std::f32::consts::TAU;
use std::time::Duration;

use fupix_core::geometry::{Size, Vec2};
use fupix_core::rng::Rng;
use fupix_core::theme::{Rgb, Theme, ThemePalette};
use tracing::debug;

use crate::config::PlexusConfig;
use crate::surface::Surface;

/// Stroke width for links.
pub const LINK_WIDTH: f32 = 0.6;

const FLICKER_RATE: f32 = 0.005;
const NODE_ALPHA_BASE: f32 = 0.35;
const NODE_ALPHA_SWING: f32 = 0.25;
const NODE_ALPHA_JITTER: f32 = 0.03;
const LINK_ALPHA_PEAK: f32 = 0.8;

/// One node of the network.
#[derive(Debug, Clone, PartialEq)]
pub struct PlexusNode {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Flicker phase offset.
    pub phase: f32,
}

/// What one plexus frame drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlexusStats {
    pub nodes_drawn: usize,
    pub links_drawn: usize,
}

/// The node network behind the detail panel.
#[derive(Debug, Clone)]
pub struct PlexusField {
    config: PlexusConfig,
    rng: Rng,
    size: Size,
    nodes: Vec<PlexusNode>,
    pointer: Option<Vec2>,
    accent: Rgb,
    running: bool,
}

impl PlexusField {
    /// Create and seed a field for `size`.
    #[must_use]
    pub fn new(config: PlexusConfig, size: Size) -> Self {
        let mut field = Self {
            rng: Rng::new(config.seed),
            config,
            size: Size::default(),
            nodes: Vec::new(),
            pointer: None,
            accent: ThemePalette::DARK.accent,
            running: true,
        };
        field.resize(size);
        field
    }

    #[must_use]
    pub fn nodes(&self) -> &[PlexusNode] {
        &self.nodes
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub fn accent(&self) -> Rgb {
        self.accent
    }

    /// Node count a fresh seed would produce for `size`.
    #[must_use]
    pub fn seed_count(&self, size: Size) -> usize {
        ((size.area().max(0.0) / self.config.area_per_node) as usize).max(self.config.min_nodes)
    }

    /// Link distance for the current size.
    #[must_use]
    pub fn max_link_distance(&self) -> f32 {
        self.config
            .max_link_distance
            .min((self.size.width + self.size.height) / 8.0)
    }

    /// Adopt a new size, reseeding when empty or when the density drifted.
    /// Returns whether the nodes were reseeded.
    pub fn resize(&mut self, size: Size) -> bool {
        self.size = size;
        let expected = (size.area().max(0.0) / self.config.reseed_area_per_node) as usize;
        let drift = self.nodes.len().abs_diff(expected);
        if self.nodes.is_empty() || drift > self.config.reseed_tolerance {
            self.seed();
            true
        } else {
            false
        }
    }

    fn seed(&mut self) {
        let count = self.seed_count(self.size);
        let speed = self.config.max_initial_speed;
        let (w, h) = (self.size.width.max(0.0), self.size.height.max(0.0));
        let rng = &mut self.rng;
        self.nodes = (0..count)
            .map(|_| PlexusNode {
                position: Vec2::new(rng.range(0.0, w), rng.range(0.0, h)),
                velocity: Vec2::new(rng.range(-speed, speed), rng.range(-speed, speed)),
                radius: rng.range(1.5, 3.5),
                phase: rng.range(0.0, TAU),
            })
            .collect();
        debug!(nodes = count, "plexus seeded");
    }

    /// Pointer position relative to the canvas.
    pub fn pointer_moved(&mut self, at: Vec2) {
        self.pointer = Some(at);
    }

    /// Pointer left the window; repulsion stops.
    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.accent = ThemePalette::for_theme(theme).accent;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.running = visible;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Move, wrap, repel and damp every node.
    pub fn step(&mut self) {
        let margin = self.config.wrap_margin;
        let (w, h) = (self.size.width, self.size.height);
        let repel = self.config.repel_radius;
        for node in &mut self.nodes {
            node.position += node.velocity;

            if node.position.x < -margin {
                node.position.x = w + margin;
            }
            if node.position.x > w + margin {
                node.position.x = -margin;
            }
            if node.position.y < -margin {
                node.position.y = h + margin;
            }
            if node.position.y > h + margin {
                node.position.y = -margin;
            }

            if let Some(pointer) = self.pointer {
                let away = node.position - pointer;
                let d_sq = away.length_squared();
                if d_sq < repel * repel {
                    let d = d_sq.sqrt().max(0.001);
                    let force = (1.0 - d / repel) * self.config.repel_strength;
                    node.velocity += away * (force / d);
                }
            }

            node.velocity = node.velocity * self.config.friction;
        }
    }

    /// Draw nodes and links at time `now`.
    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S, now: Duration) -> PlexusStats {
        surface.clear();
        surface.set_glow(self.config.glow_blur, self.accent);
        let t = now.as_secs_f32() * 1000.0 * FLICKER_RATE;
        let mut stats = PlexusStats::default();

        for node in &self.nodes {
            let jitter = self.rng.range(-NODE_ALPHA_JITTER, NODE_ALPHA_JITTER);
            let alpha = NODE_ALPHA_BASE + NODE_ALPHA_SWING * (t + node.phase).sin() + jitter;
            surface.fill_circle(node.position, node.radius, self.accent.with_alpha(alpha.max(0.0)));
            stats.nodes_drawn += 1;
        }

        let max = self.max_link_distance();
        if max <= 0.0 {
            return stats;
        }
        for (i, a) in self.nodes.iter().enumerate() {
            for b in &self.nodes[i + 1..] {
                let d = a.position.distance_squared(b.position).sqrt();
                if d >= max {
                    continue;
                }
                let flick = 0.5 + 0.5 * (t + a.phase + b.phase).sin();
                let alpha = ((1.0 - d / max) * LINK_ALPHA_PEAK * flick).max(0.0);
                if alpha > self.config.min_link_alpha {
                    surface.stroke_line(
                        a.position,
                        b.position,
                        LINK_WIDTH,
                        self.accent.with_alpha(alpha),
                    );
                    stats.links_drawn += 1;
                }
            }
        }
        stats
    }

    /// One animation frame; nothing happens while hidden.
    pub fn frame<S: Surface + ?Sized>(&mut self, now: Duration, surface: &mut S) -> PlexusStats {
        if !self.running {
            return PlexusStats::default();
        }
        self.step();
        self.render(surface, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, RecordingSurface};

    fn field(w: f32, h: f32) -> PlexusField {
        PlexusField::new(PlexusConfig::default(), Size::new(w, h))
    }

    #[test]
    fn density_has_floor() {
        assert_eq!(field(100.0, 100.0).nodes().len(), 40);
        assert_eq!(field(1100.0, 1000.0).nodes().len(), 100);
    }

    #[test]
    fn nodes_start_inside_with_bounded_velocity() {
        let f = field(800.0, 600.0);
        for n in f.nodes() {
            assert!((0.0..800.0).contains(&n.position.x));
            assert!((0.0..600.0).contains(&n.position.y));
            assert!(n.velocity.x.abs() <= 0.2 && n.velocity.y.abs() <= 0.2);
            assert!((1.5..3.5).contains(&n.radius));
        }
    }

    #[test]
    fn small_resize_keeps_nodes() {
        let mut f = field(1200.0, 1000.0);
        let before = f.nodes().to_vec();
        // expected 1210*1000/12000 = 100, current 109: within tolerance
        assert!(!f.resize(Size::new(1210.0, 1000.0)));
        assert_eq!(f.nodes(), &before[..]);
    }

    #[test]
    fn large_resize_reseeds() {
        let mut f = field(800.0, 600.0);
        assert!(f.resize(Size::new(2400.0, 1800.0)));
        assert_eq!(f.nodes().len(), 2400 * 1800 / 11000);
    }

    #[test]
    fn link_distance_is_capped() {
        assert_eq!(field(400.0, 400.0).max_link_distance(), 100.0);
        assert_eq!(field(4000.0, 4000.0).max_link_distance(), 220.0);
    }

    #[test]
    fn wraps_at_margin() {
        let mut f = field(100.0, 100.0);
        f.nodes[0].position = Vec2::new(110.0, 50.0);
        f.nodes[0].velocity = Vec2::new(0.5, 0.0);
        f.step();
        assert_eq!(f.nodes()[0].position.x, -10.0);
    }

    #[test]
    fn pointer_repels_nearby_nodes() {
        let mut f = field(400.0, 400.0);
        f.nodes[0].position = Vec2::new(200.0, 200.0);
        f.nodes[0].velocity = Vec2::ZERO;
        f.pointer_moved(Vec2::new(190.0, 200.0));
        f.step();
        assert!(f.nodes()[0].velocity.x > 0.0);
        f.pointer_left();
        let v = f.nodes()[0].velocity.x;
        f.step();
        assert_eq!(f.nodes()[0].velocity.x, v * 0.995);
    }

    #[test]
    fn render_applies_glow_and_skips_faint_links() {
        let mut f = field(400.0, 400.0);
        let mut s = RecordingSurface::new(f.size());
        let stats = f.render(&mut s, Duration::from_millis(1234));
        assert_eq!(stats.nodes_drawn, 40);
        assert_eq!(s.ops()[1], DrawOp::Glow { blur: 14.0, color: Rgb::new(0, 248, 248) });
        for op in s.ops() {
            if let DrawOp::Line { color, width, .. } = op {
                assert!(color.alpha > 0.05);
                assert_eq!(*width, LINK_WIDTH);
            }
        }
        assert_eq!(stats.links_drawn, s.line_count());
    }

    #[test]
    fn hidden_field_is_idle() {
        let mut f = field(400.0, 400.0);
        f.set_visible(false);
        let before = f.nodes().to_vec();
        let mut s = RecordingSurface::new(f.size());
        assert_eq!(f.frame(Duration::from_secs(1), &mut s), PlexusStats::default());
        assert_eq!(f.nodes(), &before[..]);
    }
}
