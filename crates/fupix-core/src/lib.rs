#![forbid(unsafe_code)]

//! Core: geometry, canonical input, deterministic timers, and theme state.
//!
//! Everything in this crate is host-agnostic. Time is a monotonic
//! [`Duration`](std::time::Duration) advanced by the embedder, so the same
//! sequence of inputs always produces the same sequence of state changes.

pub mod event;
pub mod geometry;
pub mod logging;
pub mod rng;
pub mod section;
pub mod theme;
pub mod timer;

// `crate::info!` and friends resolve here with the `tracing` feature.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
