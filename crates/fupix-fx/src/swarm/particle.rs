#![forbid(unsafe_code)]

//! A single logo particle.

use std::time::Duration;

use fupix_core::geometry::Vec2;
use fupix_core::rng::Rng;

use super::stage::SwarmPhase;

/// Velocity damping applied every spring step.
pub const FRICTION: f32 = 0.92;
/// Per-frame decay of the dispersal speed.
pub const DISPERSE_DECAY: f32 = 0.98;
/// Amplitude of the idle shimmer once assembled.
pub const SHIMMER: f32 = 0.3;

const SPAWN_MIN: f32 = 500.0;
const SPAWN_MAX: f32 = 1000.0;

/// One point of the swarm.
///
/// `target` is fixed at construction; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    target: Vec2,
    position: Vec2,
    velocity: Vec2,
    ease: f32,
    size: f32,
    activation_delay: Duration,
    created_at: Duration,
    active: bool,
    disperse_angle: f32,
    disperse_speed: f32,
    disperse_speed_base: f32,
}

impl Particle {
    /// Spawn a particle 500-1000 px away from `target` in a random direction.
    pub fn spawn(target: Vec2, now: Duration, assemble_delay: Duration, rng: &mut Rng) -> Self {
        let offset = Vec2::from_polar(rng.angle(), rng.range(SPAWN_MIN, SPAWN_MAX));
        let ease = rng.range(0.04, 0.08);
        let size = rng.range(1.0, 3.0);
        let activation_delay = assemble_delay.mul_f32(rng.next_f32());
        let disperse_angle = rng.angle();
        let disperse_speed = rng.range(10.0, 30.0);
        Self {
            target,
            position: target + offset,
            velocity: Vec2::ZERO,
            ease,
            size,
            activation_delay,
            created_at: now,
            active: false,
            disperse_angle,
            disperse_speed,
            disperse_speed_base: disperse_speed,
        }
    }

    /// Advance one frame.
    pub fn update(&mut self, phase: SwarmPhase, now: Duration) {
        match phase {
            SwarmPhase::Dispersing | SwarmPhase::Dispersed => {
                self.position += Vec2::from_polar(self.disperse_angle, self.disperse_speed);
                self.disperse_speed *= DISPERSE_DECAY;
            }
            SwarmPhase::Assembling => {
                if !self.active {
                    if now.saturating_sub(self.created_at) > self.activation_delay {
                        self.active = true;
                    } else {
                        return;
                    }
                }
                self.spring_step();
            }
            SwarmPhase::Reassembling => self.spring_step(),
            SwarmPhase::Assembled => {
                let t = now.as_secs_f32();
                self.position = Vec2::new(
                    self.target.x + (t + self.target.x * 0.01).sin() * SHIMMER,
                    self.target.y + (t + self.target.y * 0.01).cos() * SHIMMER,
                );
            }
        }
    }

    fn spring_step(&mut self) {
        self.velocity += (self.target - self.position) * self.ease;
        self.velocity = self.velocity * FRICTION;
        self.position += self.velocity;
    }

    /// Prepare for the return trip: restore dispersal speed, activate,
    /// and stop. `target` is untouched.
    pub fn reset_for_reassembly(&mut self) {
        self.disperse_speed = self.disperse_speed_base;
        self.active = true;
        self.velocity = Vec2::ZERO;
    }

    #[inline]
    pub fn target(&self) -> Vec2 {
        self.target
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[inline]
    pub fn ease(&self) -> f32 {
        self.ease
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn activation_delay(&self) -> Duration {
        self.activation_delay
    }

    #[inline]
    pub fn disperse_speed(&self) -> f32 {
        self.disperse_speed
    }
}
