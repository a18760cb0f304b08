#![forbid(unsafe_code)]

//! `web-sys` plumbing shared by the page components.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use fupix_core::theme::Theme;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, EventTarget, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, MutationObserver, MutationObserverInit,
    Window,
};
use web_time::Instant;

use crate::error::WebError;
use crate::options::dom;

pub(crate) fn window() -> Result<Window, WebError> {
    web_sys::window().ok_or(WebError::NoDocument)
}

pub(crate) fn document() -> Result<Document, WebError> {
    window()?.document().ok_or(WebError::NoDocument)
}

/// Element by id, cast to `T`.
pub(crate) fn by_id<T: JsCast>(doc: &Document, id: &str) -> Result<T, WebError> {
    doc.get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
        .ok_or_else(|| WebError::MissingElement(format!("#{id}")))
}

pub(crate) fn query(doc: &Document, selector: &str) -> Option<Element> {
    doc.query_selector(selector).ok().flatten()
}

pub(crate) fn query_all(root: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub(crate) fn set_class(el: &Element, class: &str, on: bool) {
    if let Err(err) = el.class_list().toggle_with_force(class, on) {
        warn!(class, ?err, "class toggle failed");
    }
}

pub(crate) fn set_attr(el: &Element, name: &str, value: &str) {
    if let Err(err) = el.set_attribute(name, value) {
        warn!(name, ?err, "setAttribute failed");
    }
}

pub(crate) fn remove_attr(el: &Element, name: &str) {
    if let Err(err) = el.remove_attribute(name) {
        warn!(name, ?err, "removeAttribute failed");
    }
}

/// Inline style property; an empty `value` clears it.
pub(crate) fn set_style(el: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = el.style().set_property(property, value) {
        warn!(property, ?err, "style update failed");
    }
}

pub(crate) fn focus(el: &HtmlElement) {
    if let Err(err) = el.focus() {
        warn!(?err, "focus failed");
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Monotonic time since the page started.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PageClock {
    origin: Instant,
}

impl PageClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub(crate) fn now(&self) -> Duration {
        Instant::now().duration_since(self.origin)
    }
}

// ---------------------------------------------------------------------------
// Listeners and observers
// ---------------------------------------------------------------------------

/// Attach a listener for the page lifetime. `passive == false` allows
/// `preventDefault`.
pub(crate) fn listen<E>(
    target: &EventTarget,
    event: &str,
    passive: bool,
    handler: impl FnMut(E) + 'static,
) -> Result<(), WebError>
where
    E: FromWasmAbi + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    closure.forget();
    Ok(())
}

/// Whether the browser has `IntersectionObserver`.
pub(crate) fn has_intersection_observer(window: &Window) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

/// Observe `targets`, delivering each batch of entries to `handler`.
pub(crate) fn observe_intersections(
    targets: &[Element],
    thresholds: &[f64],
    root_margin: Option<&str>,
    mut handler: impl FnMut(Vec<IntersectionObserverEntry>, &IntersectionObserver) + 'static,
) -> Result<IntersectionObserver, WebError> {
    let callback = Closure::wrap(Box::new(
        move |entries: js_sys::Array, observer: IntersectionObserver| {
            let entries = entries
                .iter()
                .filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
                .collect();
            handler(entries, &observer);
        },
    ) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);
    let init = IntersectionObserverInit::new();
    let list: js_sys::Array = thresholds.iter().map(|t| JsValue::from_f64(*t)).collect();
    init.set_threshold(&list);
    if let Some(margin) = root_margin {
        init.set_root_margin(margin);
    }
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    callback.forget();
    for target in targets {
        observer.observe(target);
    }
    Ok(observer)
}

/// Call `handler` with the new theme whenever `<html data-theme>` changes.
pub(crate) fn watch_theme(doc: &Document, mut handler: impl FnMut(Theme) + 'static) -> Result<(), WebError> {
    let root = doc.document_element().ok_or(WebError::NoDocument)?;
    let read_root = root.clone();
    let callback = Closure::wrap(Box::new(move |_records: js_sys::Array, _obs: MutationObserver| {
        let value = read_root.get_attribute(dom::THEME_ATTRIBUTE);
        handler(Theme::from_attribute(value.as_deref()));
    }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    callback.forget();
    let init = MutationObserverInit::new();
    init.set_attributes(true);
    let filter: js_sys::Array = std::iter::once(JsValue::from_str(dom::THEME_ATTRIBUTE)).collect();
    init.set_attribute_filter(&filter);
    observer.observe_with_options(&root, &init)?;
    Ok(())
}

/// Current `<html data-theme>`.
pub(crate) fn current_theme(doc: &Document) -> Theme {
    let value = doc
        .document_element()
        .and_then(|root| root.get_attribute(dom::THEME_ATTRIBUTE));
    Theme::from_attribute(value.as_deref())
}

// ---------------------------------------------------------------------------
// Animation frames
// ---------------------------------------------------------------------------

struct FrameLoopState {
    scheduled: Cell<bool>,
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

/// Self-rescheduling `requestAnimationFrame` loop. The frame callback
/// returns whether another frame is wanted; [`FrameLoop::request`] resumes
/// a stopped loop.
#[derive(Clone)]
pub(crate) struct FrameLoop(Rc<FrameLoopState>);

impl FrameLoop {
    pub(crate) fn new(clock: PageClock, mut frame: impl FnMut(Duration) -> bool + 'static) -> Self {
        let state = Rc::new(FrameLoopState {
            scheduled: Cell::new(false),
            callback: RefCell::new(None),
        });
        // The callback owns its state, so the loop lives as long as the page.
        let owner = Rc::clone(&state);
        let closure = Closure::wrap(Box::new(move || {
            owner.scheduled.set(false);
            if frame(clock.now()) {
                FrameLoop(Rc::clone(&owner)).request();
            }
        }) as Box<dyn FnMut()>);
        *state.callback.borrow_mut() = Some(closure);
        Self(state)
    }

    /// Schedule the next frame unless one is already pending.
    pub(crate) fn request(&self) {
        if self.0.scheduled.get() {
            return;
        }
        let Ok(window) = window() else {
            return;
        };
        let callback = self.0.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return;
        };
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(_) => self.0.scheduled.set(true),
            Err(err) => warn!(?err, "requestAnimationFrame failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Timers
// ---------------------------------------------------------------------------

struct TimerPumpState {
    clock: PageClock,
    handle: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

/// One `setTimeout` armed for the earliest controller deadline, so timers
/// fire even while the frame loop is paused. The fire callback returns the
/// next deadline and the pump re-arms itself.
#[derive(Clone)]
pub(crate) struct TimerPump(Rc<TimerPumpState>);

impl TimerPump {
    pub(crate) fn new(
        clock: PageClock,
        mut fire: impl FnMut(Duration) -> Option<Duration> + 'static,
    ) -> Self {
        let state = Rc::new(TimerPumpState {
            clock,
            handle: Cell::new(None),
            callback: RefCell::new(None),
        });
        let owner = Rc::clone(&state);
        let closure = Closure::wrap(Box::new(move || {
            owner.handle.set(None);
            let next = fire(owner.clock.now());
            TimerPump(Rc::clone(&owner)).arm(next);
        }) as Box<dyn FnMut()>);
        *state.callback.borrow_mut() = Some(closure);
        Self(state)
    }

    /// Replace any armed timeout with one for `deadline`.
    pub(crate) fn arm(&self, deadline: Option<Duration>) {
        let Ok(window) = window() else {
            return;
        };
        if let Some(handle) = self.0.handle.take() {
            window.clear_timeout_with_handle(handle);
        }
        let Some(deadline) = deadline else {
            return;
        };
        let delay = deadline.saturating_sub(self.0.clock.now());
        let delay_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let callback = self.0.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return;
        };
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay_ms,
        ) {
            Ok(handle) => self.0.handle.set(Some(handle)),
            Err(err) => warn!(?err, "setTimeout failed"),
        }
    }
}
