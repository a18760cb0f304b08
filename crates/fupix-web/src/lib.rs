#![forbid(unsafe_code)]

//! WASM frontend for the Fupix site.
//!
//! The exported [`FupixSite`] wires the host-agnostic controllers from
//! `fupix-fx` and `fupix-site` to the page: canvases, observers, scroll and
//! keyboard listeners, `localStorage`, and the animation/timer loops.
//!
//! DOM input normalization ([`input`]) and option parsing ([`options`]) are
//! plain Rust and tested natively; everything touching `web-sys` lives in
//! the wasm-only module.

pub mod error;
pub mod input;
pub mod options;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::FupixSite;

pub use error::WebError;
pub use input::DomInput;
pub use options::SiteOptions;

/// Native builds compile this crate as a stub so `cargo test --workspace`
/// stays green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct FupixSite {
    options: SiteOptions,
    started: bool,
}

#[cfg(not(target_arch = "wasm32"))]
impl FupixSite {
    /// Build with optional JSON options.
    pub fn new(options: Option<String>) -> Result<Self, WebError> {
        Ok(Self {
            options: SiteOptions::from_optional_json(options.as_deref())?,
            started: false,
        })
    }

    #[must_use]
    pub fn options(&self) -> &SiteOptions {
        &self.options
    }

    /// There is no page to wire natively; only the idempotence flag moves.
    pub fn start(&mut self) -> Result<(), WebError> {
        self.started = true;
        Ok(())
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }
}
