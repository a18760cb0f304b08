#![forbid(unsafe_code)]

//! The particle logo.
//!
//! Text is sampled into particle targets ([`crate::shape`]); particles fly
//! in, hold the logo, scatter when the visitor scrolls away from the home
//! panel and spring back when they return. [`TransitionController`] ties
//! this to page scrolling.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use fupix_core::event::InputEvent;
//! use fupix_core::geometry::{Rect, Size};
//! use fupix_fx::shape::GlyphBlockHost;
//! use fupix_fx::swarm::{HostCommand, Stage, TransitionController};
//! use fupix_fx::SwarmConfig;
//!
//! let view = Size::new(800.0, 600.0);
//! let host = GlyphBlockHost::new(Some(Rect::from_size(view)));
//! let mut swarm =
//!     TransitionController::start(SwarmConfig::default(), host, view, Duration::ZERO).unwrap();
//!
//! swarm.tick(Duration::from_millis(3500));
//! assert_eq!(swarm.stage(), Stage::Assembled);
//!
//! let wheel = InputEvent::Wheel { delta_y: 120.0 };
//! assert!(swarm.handle_input(&wheel, Some(0), Duration::from_millis(4000)).is_intercept());
//! assert!(swarm.drain_commands().contains(&HostCommand::LockScroll));
//! ```

mod controller;
mod particle;
mod render;
mod stage;

pub use controller::{GestureResponse, HostCommand, Markers, TransitionController};
pub use particle::{DISPERSE_DECAY, FRICTION, Particle};
pub use render::{FrameStats, LINE_ALPHA, LINE_WIDTH, render_swarm};
pub use stage::{Stage, SwarmPhase};

/// DOM id of the element the logo text is right-aligned to.
pub const ANCHOR_ELEMENT_ID: &str = "textTarget";
