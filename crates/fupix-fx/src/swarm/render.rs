#![forbid(unsafe_code)]

//! Swarm drawing.
//!
//! Scattered phases draw every particle as a square with no lines. Other
//! phases draw each particle followed by its connections to the next
//! `connection_lookahead` particles in array order; inactive particles are
//! skipped entirely while assembling.

use fupix_core::geometry::Size;
use fupix_core::theme::Rgb;

use super::particle::Particle;
use super::stage::SwarmPhase;
use crate::surface::Surface;

/// Peak alpha of a connection line.
pub const LINE_ALPHA: f32 = 0.5;
/// Connection line width.
pub const LINE_WIDTH: f32 = 0.8;

/// What one frame drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub particles_drawn: usize,
    pub lines_drawn: usize,
}

/// Clear `surface` and draw the swarm.
pub fn render_swarm<S: Surface + ?Sized>(
    surface: &mut S,
    particles: &[Particle],
    phase: SwarmPhase,
    accent: Rgb,
    connection_distance: f32,
    lookahead: usize,
) -> FrameStats {
    surface.clear();
    let mut stats = FrameStats::default();
    let solid = accent.with_alpha(1.0);

    if phase.is_scattered() {
        for p in particles {
            surface.fill_rect(p.position(), Size::new(p.size(), p.size()), solid);
        }
        stats.particles_drawn = particles.len();
        return stats;
    }

    let max_sq = connection_distance * connection_distance;
    let skip_inactive = phase == SwarmPhase::Assembling;
    let n = particles.len();
    for (i, p1) in particles.iter().enumerate() {
        if skip_inactive && !p1.is_active() {
            continue;
        }
        surface.fill_rect(p1.position(), Size::new(p1.size(), p1.size()), solid);
        stats.particles_drawn += 1;

        let end = n.min(i.saturating_add(lookahead));
        for p2 in particles.get(i + 1..end).unwrap_or_default() {
            if skip_inactive && !p2.is_active() {
                continue;
            }
            let d_sq = p1.position().distance_squared(p2.position());
            if d_sq < max_sq {
                let alpha = (1.0 - d_sq / max_sq) * LINE_ALPHA;
                surface.stroke_line(
                    p1.position(),
                    p2.position(),
                    LINE_WIDTH,
                    accent.with_alpha(alpha),
                );
                stats.lines_drawn += 1;
            }
        }
    }
    stats
}
