#![forbid(unsafe_code)]

//! Canvas effects for the Fupix landing page.
//!
//! - [`swarm`]: the scroll-gated particle logo and its transition controller.
//! - [`plexus`]: drifting, pointer-repelled node network.
//! - [`gridbox`]: perspective grid tunnel backdrop.
//!
//! Design goals:
//! - **Deterministic**: time is an explicit monotonic `Duration` and all
//!   randomness comes from a seeded [`Rng`](fupix_core::rng::Rng).
//! - **Host-agnostic**: drawing goes through [`Surface`] and DOM effects are
//!   queued as commands, so everything runs natively under test.
//! - **Tiny-area safe**: zero-sized canvases must not panic.

pub mod config;
pub mod error;
pub mod gridbox;
pub mod plexus;
pub mod shape;
pub mod surface;
pub mod swarm;

pub use config::{GridboxConfig, PlexusConfig, SwarmConfig};
pub use error::FxError;
pub use surface::{DrawOp, RecordingSurface, Surface};
