#![forbid(unsafe_code)]

//! Browser bindings. Each component installs independently: a missing
//! element or API disables that component and is logged, the rest of the
//! page keeps working.

mod backdrops;
mod canvas;
mod certificates;
mod contact;
mod dom;
mod home;
mod page;
mod storage;

use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::Document;

use crate::error::WebError;
use crate::options::SiteOptions;
use dom::PageClock;

fn report(component: &'static str, result: Result<(), WebError>) {
    match result {
        Ok(()) => info!(component, "component started"),
        Err(err) => warn!(component, %err, "component disabled"),
    }
}

async fn fonts_ready(doc: &Document) {
    match doc.fonts().ready() {
        Ok(promise) => {
            if let Err(err) = JsFuture::from(promise).await {
                warn!(?err, "font loading failed; sampling with fallback fonts");
            }
        }
        Err(err) => warn!(?err, "document.fonts unavailable"),
    }
}

/// The page entry point exported to JavaScript.
#[wasm_bindgen]
pub struct FupixSite {
    options: SiteOptions,
    started: bool,
}

#[wasm_bindgen]
impl FupixSite {
    /// Build with an optional JSON options object (missing fields keep
    /// their defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<String>) -> Result<FupixSite, JsValue> {
        let options = SiteOptions::from_optional_json(options.as_deref()).map_err(WebError::from)?;
        Ok(Self {
            options,
            started: false,
        })
    }

    /// Wire every component on the current page. Calling it again is a
    /// no-op.
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        let doc = dom::document()?;
        let clock = PageClock::new();
        let opts = self.options.clone();

        report("theme", page::install_theme(&doc));
        report("reveal", page::install_reveal(&doc, opts.reveal, clock));
        report("navbar", page::install_navbar(&doc));
        report("plexus", backdrops::install_plexus(&doc, opts.plexus, clock));
        report("gridbox", backdrops::install_gridbox(&doc, opts.gridbox, clock));
        report("certificates", certificates::install_certificates(&doc));
        report("contact", contact::install_contact(&doc, opts.contact));

        // The shape sampler rasterizes the heading text, so it has to wait
        // for web fonts.
        let swarm = opts.swarm;
        spawn_local(async move {
            fonts_ready(&doc).await;
            report("home", home::install(&doc, swarm, clock));
        });
        Ok(())
    }

    #[wasm_bindgen(js_name = isStarted)]
    pub fn is_started(&self) -> bool {
        self.started
    }
}
