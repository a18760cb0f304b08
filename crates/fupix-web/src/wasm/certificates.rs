#![forbid(unsafe_code)]

//! Certificate modal: gallery cards, detail view and the lightbox.
//!
//! Every handler feeds the [`CertificateViewer`] and then re-renders from
//! its state, so the DOM never holds navigation state of its own.

use std::cell::RefCell;
use std::rc::Rc;

use fupix_site::certificates::{
    Certificate, CertificateViewer, FocusPosition, FocusTarget, KeyOutcome, ModalView,
    ViewerEffect,
};
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlImageElement, KeyboardEvent,
    TouchEvent,
};

use super::dom::{by_id, focus, listen, query_all, remove_attr, set_attr, set_class, set_style};
use crate::error::WebError;
use crate::input::{key_event, modifier_bits};

const FOCUSABLE: &str = "button:not([disabled]), [href], input:not([disabled]), \
    select:not([disabled]), textarea:not([disabled]), [tabindex]:not([tabindex=\"-1\"])";

const LIGHTBOX_HTML: &str = r#"<div class="cert-lightbox" id="certLightbox" aria-hidden="true" role="dialog" aria-modal="true" aria-label="Full size certificate image">
  <div class="cert-lightbox-backdrop"></div>
  <div class="cert-lightbox-content">
    <button class="cert-lightbox-close" id="certLightboxClose" aria-label="Close full size image"><i class="fas fa-times"></i></button>
    <button class="cert-lightbox-nav cert-lightbox-prev" id="certLightboxPrev" aria-label="Previous image"><i class="fas fa-chevron-left"></i></button>
    <div class="cert-lightbox-image-wrapper"><img src="" alt="Certificate full size" class="cert-lightbox-image" id="certLightboxImage"></div>
    <button class="cert-lightbox-nav cert-lightbox-next" id="certLightboxNext" aria-label="Next image"><i class="fas fa-chevron-right"></i></button>
    <div class="cert-lightbox-caption" id="certLightboxCaption"></div>
    <div class="cert-lightbox-counter" id="certLightboxCounter"></div>
  </div>
</div>"#;

struct CertDom {
    doc: Document,
    viewer: RefCell<CertificateViewer>,
    overlay: Element,
    modal: Option<Element>,
    gallery: Element,
    detail: Element,
    opener: Option<HtmlElement>,
    back: Option<HtmlElement>,
    prev: Option<Element>,
    next: Option<Element>,
    detail_image: Option<HtmlImageElement>,
    lightbox: Element,
    swipe_start: RefCell<f32>,
}

fn text(doc: &Document, id: &str, value: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        el.set_text_content(Some(value));
    }
}

fn set_disabled(el: &Element, disabled: bool) {
    if disabled {
        set_attr(el, "disabled", "");
    } else {
        remove_attr(el, "disabled");
    }
}

fn focus_first(el: Option<&Element>) {
    if let Some(el) = el.and_then(|el| el.dyn_ref::<HtmlElement>()) {
        focus(el);
    }
}

impl CertDom {
    fn find(doc: &Document) -> Result<Self, WebError> {
        let overlay = by_id::<Element>(doc, "certModalOverlay")?;
        let gallery = by_id::<Element>(doc, "certGalleryView")?;
        let detail = by_id::<Element>(doc, "certDetailView")?;
        let lightbox = match doc.get_element_by_id("certLightbox") {
            Some(el) => el,
            None => {
                let body = doc.body().ok_or(WebError::NoDocument)?;
                body.insert_adjacent_html("beforeend", LIGHTBOX_HTML)?;
                by_id::<Element>(doc, "certLightbox")?
            }
        };
        let html = |id: &str| by_id::<HtmlElement>(doc, id).ok();
        Ok(Self {
            doc: doc.clone(),
            viewer: RefCell::new(CertificateViewer::default()),
            overlay,
            modal: doc.get_element_by_id("certModal"),
            gallery,
            detail,
            opener: html("openCertModalBtn"),
            back: html("certBackBtn"),
            prev: doc.get_element_by_id("certPrevBtn"),
            next: doc.get_element_by_id("certNextBtn"),
            detail_image: by_id::<HtmlImageElement>(doc, "certDetailImage").ok(),
            lightbox,
            swipe_start: RefCell::new(0.0),
        })
    }

    fn build_gallery(self: &Rc<Self>) -> Result<(), WebError> {
        self.gallery.set_inner_html("");
        let certificates = self.viewer.borrow().certificates();
        for (index, cert) in certificates.iter().enumerate() {
            let card = self.doc.create_element("div")?;
            card.set_class_name(if cert.featured { "cert-card featured" } else { "cert-card" });
            card.set_attribute("data-index", &index.to_string())?;
            card.set_attribute("tabindex", "0")?;
            card.set_attribute("role", "button")?;
            card.set_attribute("aria-label", &format!("View {} certificate", cert.title))?;

            let img = self.doc.create_element("img")?;
            img.set_attribute("src", cert.image)?;
            img.set_attribute("alt", cert.title)?;
            img.set_attribute("loading", "lazy")?;
            let info = self.doc.create_element("div")?;
            info.set_class_name("cert-card-info");
            let title = self.doc.create_element("h4")?;
            title.set_text_content(Some(cert.title));
            let org = self.doc.create_element("p")?;
            org.set_text_content(Some(cert.organization));
            info.append_child(&title)?;
            info.append_child(&org)?;
            card.append_child(&img)?;
            card.append_child(&info)?;

            let target: EventTarget = card.clone().into();
            let this = Rc::clone(self);
            listen(&target, "click", true, move |_: Event| {
                this.update(|v| {
                    v.show_detail(index);
                });
            })?;
            let this = Rc::clone(self);
            listen(&target, "keydown", false, move |ev: KeyboardEvent| {
                if key_event(&ev.key(), 0).code.is_activation() {
                    ev.prevent_default();
                    this.update(|v| {
                        v.show_detail(index);
                    });
                }
            })?;
            self.gallery.append_child(&card)?;
        }
        debug!(count = certificates.len(), "certificate gallery built");
        Ok(())
    }

    /// Run `f` against the viewer, then re-render and perform its effects.
    fn update<R>(&self, f: impl FnOnce(&mut CertificateViewer) -> R) -> R {
        let (out, effects) = {
            let mut viewer = self.viewer.borrow_mut();
            let out = f(&mut viewer);
            (out, viewer.drain_effects())
        };
        self.render();
        for effect in effects {
            self.perform(effect);
        }
        out
    }

    fn render(&self) {
        let viewer = self.viewer.borrow();
        let open = viewer.is_open();
        set_class(&self.overlay, "active", open);
        set_attr(&self.overlay, "aria-hidden", if open { "false" } else { "true" });

        let detail = match viewer.view() {
            ModalView::Detail(i) => Some(i),
            _ => None,
        };
        set_class(&self.gallery, "hidden", detail.is_some());
        set_class(&self.detail, "active", detail.is_some());
        if let (Some(index), Some(cert)) = (detail, viewer.current()) {
            self.render_detail(&viewer, index, cert);
        }

        let lightbox = viewer.lightbox();
        set_class(&self.lightbox, "active", lightbox.is_some());
        set_attr(
            &self.lightbox,
            "aria-hidden",
            if lightbox.is_some() { "false" } else { "true" },
        );
        if let Some(index) = lightbox {
            self.render_lightbox(&viewer, index);
        }
    }

    fn render_detail(&self, viewer: &CertificateViewer, index: usize, cert: &Certificate) {
        if let Some(img) = &self.detail_image {
            img.set_src(cert.image);
            img.set_alt(cert.title);
        }
        text(&self.doc, "certDetailTitle", cert.title);
        text(&self.doc, "certDetailOrganization", cert.organization);
        text(&self.doc, "certDetailDate", cert.date);
        text(&self.doc, "certDetailCredentialId", cert.credential_id);
        text(&self.doc, "certDetailDescription", cert.description);

        let nav = viewer.nav_state(index);
        if let Some(prev) = &self.prev {
            set_disabled(prev, !nav.prev_enabled);
            set_attr(prev, "aria-label", &nav.prev_label);
        }
        if let Some(next) = &self.next {
            set_disabled(next, !nav.next_enabled);
            set_attr(next, "aria-label", &nav.next_label);
        }
    }

    fn render_lightbox(&self, viewer: &CertificateViewer, index: usize) {
        let Some(cert) = viewer.certificates().get(index) else {
            return;
        };
        if let Ok(img) = by_id::<HtmlImageElement>(&self.doc, "certLightboxImage") {
            img.set_src(cert.image);
            img.set_alt(cert.title);
        }
        let nav = viewer.nav_state(index);
        text(&self.doc, "certLightboxCaption", cert.title);
        text(&self.doc, "certLightboxCounter", &nav.counter);
        for (id, enabled) in [("certLightboxPrev", nav.prev_enabled), ("certLightboxNext", nav.next_enabled)] {
            if let Ok(button) = by_id::<HtmlElement>(&self.doc, id) {
                set_disabled(&button, !enabled);
                set_style(&button, "visibility", if enabled { "visible" } else { "hidden" });
            }
        }
    }

    fn focusables(&self) -> Vec<Element> {
        let Some(modal) = &self.modal else {
            return Vec::new();
        };
        let Ok(list) = modal.query_selector_all(FOCUSABLE) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .collect()
    }

    fn focus_position(&self) -> FocusPosition {
        let all = self.focusables();
        let active = self.doc.active_element();
        let is = |el: Option<&Element>| match (el, active.as_ref()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        match (is(all.first()), is(all.last())) {
            (true, true) => FocusPosition::Only,
            (true, false) => FocusPosition::First,
            (false, true) => FocusPosition::Last,
            (false, false) => FocusPosition::Other,
        }
    }

    fn perform(&self, effect: ViewerEffect) {
        match effect {
            ViewerEffect::LockBodyScroll | ViewerEffect::UnlockBodyScroll => {
                if let Some(body) = self.doc.body() {
                    let value = if effect == ViewerEffect::LockBodyScroll { "hidden" } else { "" };
                    set_style(&body, "overflow", value);
                }
            }
            ViewerEffect::Focus(target) => match target {
                FocusTarget::FirstCard => {
                    focus_first(query_all(&self.doc, "#certGalleryView .cert-card").first());
                }
                FocusTarget::BackButton => {
                    if let Some(back) = &self.back {
                        focus(back);
                    }
                }
                FocusTarget::Opener => {
                    if let Some(opener) = &self.opener {
                        focus(opener);
                    }
                }
                FocusTarget::DetailImage => {
                    if let Some(img) = &self.detail_image {
                        focus(img);
                    }
                }
                FocusTarget::FirstFocusable => focus_first(self.focusables().first()),
                FocusTarget::LastFocusable => focus(self.focusables().last()),
            },
        }
    }
}

fn first_touch_x(ev: &TouchEvent) -> Option<f32> {
    ev.changed_touches().get(0).map(|t| t.screen_x() as f32)
}

fn on_click(
    doc: &Document,
    id: &str,
    this: &Rc<CertDom>,
    action: impl Fn(&mut CertificateViewer) + 'static,
) -> Result<(), WebError> {
    let Some(el) = doc.get_element_by_id(id) else {
        return Ok(());
    };
    let target: EventTarget = el.into();
    let this = Rc::clone(this);
    listen(&target, "click", false, move |ev: Event| {
        ev.prevent_default();
        ev.stop_propagation();
        this.update(&action);
    })
}

fn on_swipe(target: &Element, this: &Rc<CertDom>, in_lightbox: bool) -> Result<(), WebError> {
    let target: EventTarget = target.clone().into();
    let start = Rc::clone(this);
    listen(&target, "touchstart", true, move |ev: TouchEvent| {
        if let Some(x) = first_touch_x(&ev) {
            *start.swipe_start.borrow_mut() = x;
        }
    })?;
    let end = Rc::clone(this);
    listen(&target, "touchend", true, move |ev: TouchEvent| {
        if let Some(x) = first_touch_x(&ev) {
            let from = *end.swipe_start.borrow();
            end.update(|v| {
                v.handle_swipe(from, x, in_lightbox);
            });
        }
    })
}

/// Wire the certificate modal. Pages without the modal markup skip it.
pub(crate) fn install_certificates(doc: &Document) -> Result<(), WebError> {
    let this = Rc::new(CertDom::find(doc)?);
    this.build_gallery()?;
    this.render();

    if this.opener.is_none() {
        warn!("certificate modal has no open button");
    }
    on_click(doc, "openCertModalBtn", &this, CertificateViewer::open)?;
    on_click(doc, "closeCertModalBtn", &this, CertificateViewer::close)?;
    on_click(doc, "certBackBtn", &this, CertificateViewer::show_gallery)?;
    on_click(doc, "certPrevBtn", &this, |v| {
        v.show_previous();
    })?;
    on_click(doc, "certNextBtn", &this, |v| {
        v.show_next();
    })?;
    on_click(doc, "certLightboxClose", &this, CertificateViewer::close_lightbox)?;
    on_click(doc, "certLightboxPrev", &this, |v| {
        v.lightbox_previous();
    })?;
    on_click(doc, "certLightboxNext", &this, |v| {
        v.lightbox_next();
    })?;

    {
        let overlay: EventTarget = this.overlay.clone().into();
        let this = Rc::clone(&this);
        listen(&overlay, "click", true, move |ev: Event| {
            let on_backdrop = ev
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .is_some_and(|t| t == this.overlay);
            if on_backdrop {
                this.update(CertificateViewer::close);
            }
        })?;
    }
    if let Some(backdrop) = this.lightbox.query_selector(".cert-lightbox-backdrop").ok().flatten() {
        let backdrop: EventTarget = backdrop.into();
        let this = Rc::clone(&this);
        listen(&backdrop, "click", false, move |ev: Event| {
            ev.prevent_default();
            this.update(CertificateViewer::close_lightbox);
        })?;
    }

    if let Some(img) = this.detail_image.clone() {
        img.set_attribute("tabindex", "0")?;
        img.set_attribute("role", "button")?;
        img.set_attribute("aria-label", "Click to view full size image")?;
        let target: EventTarget = img.into();
        let click = Rc::clone(&this);
        listen(&target, "click", false, move |ev: Event| {
            ev.prevent_default();
            click.update(|v| {
                v.open_lightbox(None);
            });
        })?;
        let key = Rc::clone(&this);
        listen(&target, "keydown", false, move |ev: KeyboardEvent| {
            if key_event(&ev.key(), 0).code.is_activation() {
                ev.prevent_default();
                key.update(|v| {
                    v.open_lightbox(None);
                });
            }
        })?;
    }

    {
        let doc_target: EventTarget = doc.clone().into();
        let this = Rc::clone(&this);
        listen(&doc_target, "keydown", false, move |ev: KeyboardEvent| {
            let mods = modifier_bits(ev.shift_key(), ev.alt_key(), ev.ctrl_key(), ev.meta_key());
            let key = key_event(&ev.key(), mods);
            let focus = this.focus_position();
            if this.update(|v| v.handle_key(&key, focus)) == KeyOutcome::Handled {
                ev.prevent_default();
            }
        })?;
    }

    on_swipe(&this.detail, &this, false)?;
    if let Some(wrapper) = this
        .lightbox
        .query_selector(".cert-lightbox-image-wrapper")
        .ok()
        .flatten()
    {
        on_swipe(&wrapper, &this, true)?;
    }
    info!("certificate modal ready");
    Ok(())
}
