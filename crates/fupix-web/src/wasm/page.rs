#![forbid(unsafe_code)]

//! Theme toggle, scroll reveal and navbar.

use std::cell::RefCell;
use std::rc::Rc;

use fupix_core::theme::{Theme, ThemeStore};
use fupix_site::nav::{ActiveSection, NavbarState};
use fupix_site::reveal::{
    ElementId, GroupId, RevealConfig, RevealEvent, ScrollReveal, SectionId, SectionSample,
};
use tracing::{debug, info};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, IntersectionObserver, Node};

use super::dom::{
    PageClock, TimerPump, by_id, has_intersection_observer, listen, observe_intersections, query,
    query_all, set_attr, set_class, set_style, window,
};
use super::storage::LocalStorage;
use crate::error::WebError;
use crate::options::dom;

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

fn apply_theme(doc: &Document, theme: Theme) {
    if let Some(root) = doc.document_element() {
        set_attr(&root, dom::THEME_ATTRIBUTE, theme.as_str());
    }
    let light = theme == Theme::Light;
    for (selector, shown) in [(".logo-dark", !light), (".logo-light", light)] {
        if let Some(logo) = query(doc, selector).and_then(|el| el.dyn_into::<HtmlElement>().ok()) {
            set_style(&logo, "display", if shown { "block" } else { "none" });
        }
    }
}

/// Apply the stored theme and wire the toggle button. Canvases follow the
/// `data-theme` attribute on their own.
pub(crate) fn install_theme(doc: &Document) -> Result<(), WebError> {
    let scheme = window()?
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten();
    let prefers_dark = scheme.as_ref().is_none_or(|mq| mq.matches());
    let store = ThemeStore::load(LocalStorage::open(), prefers_dark);
    apply_theme(doc, store.theme());
    let store = Rc::new(RefCell::new(store));

    let flush = {
        let store = Rc::clone(&store);
        let doc = doc.clone();
        move || {
            let mut store = store.borrow_mut();
            let last = store.drain_changes().last();
            if let Some(change) = last {
                apply_theme(&doc, change.to);
            }
        }
    };
    let flush = Rc::new(flush);

    let toggle: EventTarget = by_id::<Element>(doc, dom::THEME_TOGGLE)?.into();
    {
        let store = Rc::clone(&store);
        let flush = Rc::clone(&flush);
        listen(&toggle, "click", true, move |_: Event| {
            let theme = store.borrow_mut().toggle();
            debug!(theme = theme.as_str(), "theme toggled");
            flush();
        })?;
    }
    if let Some(scheme) = scheme {
        let reader = scheme.clone();
        let target: EventTarget = scheme.into();
        listen(&target, "change", true, move |_: Event| {
            store.borrow_mut().system_preference_changed(reader.matches());
            flush();
        })?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Scroll reveal
// ---------------------------------------------------------------------------

struct RevealDom {
    reveal: ScrollReveal,
    elements: Vec<(ElementId, Element)>,
    sections: Vec<(SectionId, Element)>,
    groups: Vec<(GroupId, Element)>,
    body: Option<HtmlElement>,
}

impl RevealDom {
    fn element_id(&self, el: &Element) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, e)| same_node(e, el))
            .map(|(id, _)| *id)
    }

    fn section_id(&self, el: &Element) -> Option<SectionId> {
        self.sections
            .iter()
            .find(|(_, e)| same_node(e, el))
            .map(|(id, _)| *id)
    }

    fn apply(&mut self, observer: Option<&IntersectionObserver>) {
        for event in self.reveal.drain_events() {
            match event {
                RevealEvent::Show(id) | RevealEvent::Hide(id) => {
                    if let Some((_, el)) = self.elements.iter().find(|(e, _)| *e == id) {
                        set_class(el, "is-visible", matches!(event, RevealEvent::Show(_)));
                    }
                }
                RevealEvent::Unobserve(id) => {
                    let el = self.elements.iter().find(|(e, _)| *e == id);
                    if let (Some(observer), Some((_, el))) = (observer, el) {
                        observer.unobserve(el);
                    }
                }
                RevealEvent::Section(id, state) => {
                    if let Some((_, el)) = self.sections.iter().find(|(s, _)| *s == id) {
                        set_attr(el, "data-section-state", state.as_str());
                    }
                }
                RevealEvent::Connectors(id) => {
                    if let Some((_, el)) = self.groups.iter().find(|(g, _)| *g == id) {
                        set_class(el, "connectors-visible", true);
                    }
                }
                RevealEvent::Scrolling(on) => {
                    if let Some(body) = &self.body {
                        set_class(body, "is-scrolling", on);
                    }
                }
            }
        }
    }
}

fn same_node(a: &Element, b: &Element) -> bool {
    let b: &Node = b;
    a.is_same_node(Some(b))
}

fn viewport_height() -> f32 {
    window()
        .ok()
        .and_then(|w| w.inner_height().ok())
        .and_then(|h| h.as_f64())
        .unwrap_or(0.0) as f32
}

/// Reveal `[data-animate]` elements, track section states and flag
/// active scrolling.
pub(crate) fn install_reveal(doc: &Document, config: RevealConfig, clock: PageClock) -> Result<(), WebError> {
    let threshold = f64::from(config.threshold);
    let root_margin = config.root_margin.clone();
    let mut reveal = ScrollReveal::new(config);
    let vh = viewport_height();

    let groups: Vec<_> = query_all(doc, dom::HONEYCOMB)
        .into_iter()
        .map(|el| (reveal.add_group(), el))
        .collect();
    let elements: Vec<_> = query_all(doc, dom::ANIMATED)
        .into_iter()
        .map(|el| {
            let group = el
                .closest(dom::HONEYCOMB)
                .ok()
                .flatten()
                .and_then(|layout| {
                    groups
                        .iter()
                        .find(|(_, g)| same_node(g, &layout))
                        .map(|(id, _)| *id)
                });
            (reveal.add_element(group), el)
        })
        .collect();
    let sections: Vec<_> = query_all(doc, dom::TRACKED_SECTIONS)
        .into_iter()
        .map(|el| {
            let rect = el.get_bounding_client_rect();
            (reveal.add_section(rect.top() as f32, rect.bottom() as f32, vh), el)
        })
        .collect();

    let state = Rc::new(RefCell::new(RevealDom {
        reveal,
        elements,
        sections,
        groups,
        body: doc.body(),
    }));

    if has_intersection_observer(&window()?) {
        let targets: Vec<Element> = state.borrow().elements.iter().map(|(_, e)| e.clone()).collect();
        {
            let state = Rc::clone(&state);
            observe_intersections(&targets, &[threshold], Some(&root_margin), move |entries, observer| {
                let mut state = state.borrow_mut();
                for entry in entries {
                    if let Some(id) = state.element_id(&entry.target()) {
                        state.reveal.element_intersection(id, entry.is_intersecting());
                    }
                }
                state.apply(Some(observer));
            })?;
        }
        let targets: Vec<Element> = state.borrow().sections.iter().map(|(_, e)| e.clone()).collect();
        {
            let state = Rc::clone(&state);
            observe_intersections(
                &targets,
                &[0.0, 0.3, 0.5, 0.7, 1.0],
                Some("-5% 0px -5% 0px"),
                move |entries, _| {
                    let vh = viewport_height();
                    let mut state = state.borrow_mut();
                    for entry in entries {
                        let Some(id) = state.section_id(&entry.target()) else {
                            continue;
                        };
                        let rect = entry.bounding_client_rect();
                        let sample = SectionSample {
                            is_intersecting: entry.is_intersecting(),
                            intersection_ratio: entry.intersection_ratio() as f32,
                            top: rect.top() as f32,
                            bottom: rect.bottom() as f32,
                            viewport_height: vh,
                        };
                        state.reveal.section_intersection(id, &sample);
                    }
                    state.apply(None);
                },
            )?;
        }
    } else {
        state.borrow_mut().reveal.fallback();
    }
    state.borrow_mut().apply(None);

    let pump = {
        let state = Rc::clone(&state);
        TimerPump::new(clock, move |now| {
            let mut state = state.borrow_mut();
            state.reveal.tick(now);
            state.apply(None);
            state.reveal.next_deadline()
        })
    };
    let scroller: EventTarget = match query(doc, dom::SCROLL_CONTAINER) {
        Some(container) => container.into(),
        None => window()?.into(),
    };
    {
        let state = Rc::clone(&state);
        listen(&scroller, "scroll", true, move |_: Event| {
            let mut state = state.borrow_mut();
            state.reveal.on_scroll(clock.now());
            state.apply(None);
            pump.arm(state.reveal.next_deadline());
        })?;
    }

    let state = state.borrow();
    info!(
        elements = state.elements.len(),
        sections = state.sections.len(),
        "scroll reveal ready"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Navbar
// ---------------------------------------------------------------------------

fn highlight_link(doc: &Document, section_id: &str) {
    for link in query_all(doc, dom::NAV_LINKS) {
        if let Ok(link) = link.dyn_into::<HtmlElement>() {
            set_style(&link, "color", "var(--muted)");
            set_style(&link, "text-shadow", "none");
        }
    }
    let selector = format!("{}[href=\"#{section_id}\"]", dom::NAV_LINKS);
    if let Some(active) = query(doc, &selector).and_then(|el| el.dyn_into::<HtmlElement>().ok()) {
        set_style(&active, "color", "var(--neon)");
        set_style(&active, "text-shadow", "0 0 10px var(--btn-glow)");
    }
}

/// Auto-hide the navbar on downward scrolls and highlight the link of the
/// section in view.
pub(crate) fn install_navbar(doc: &Document) -> Result<(), WebError> {
    let navbar = query(doc, dom::NAVBAR)
        .ok_or_else(|| WebError::MissingElement(dom::NAVBAR.to_string()))?;
    let container = query(doc, dom::SCROLL_CONTAINER)
        .ok_or_else(|| WebError::MissingElement(dom::SCROLL_CONTAINER.to_string()))?;

    let nav = Rc::new(RefCell::new(NavbarState::new()));
    {
        let reader = container.clone();
        let target: EventTarget = container.into();
        listen(&target, "scroll", true, move |_: Event| {
            if let Some(hidden) = nav.borrow_mut().on_scroll(reader.scroll_top() as f32) {
                set_class(&navbar, "nav-hidden", hidden);
            }
        })?;
    }

    if has_intersection_observer(&window()?) {
        let active = Rc::new(RefCell::new(ActiveSection::new()));
        let doc = doc.clone();
        let sections = query_all(&doc, dom::SECTIONS);
        observe_intersections(&sections, &[0.5], None, move |entries, _| {
            for entry in entries {
                let id = entry.target().id();
                if let Some(id) = active.borrow_mut().on_intersection(&id, entry.is_intersecting()) {
                    debug!(section = id, "active section");
                    highlight_link(&doc, id);
                }
            }
        })?;
    }
    Ok(())
}
