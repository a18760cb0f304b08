#![forbid(unsafe_code)]

//! Home panel: the particle logo and its scroll gate.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use fupix_core::geometry::Size;
use fupix_core::section::section_index;
use fupix_fx::swarm::{HostCommand, Markers, TransitionController};
use fupix_fx::{FxError, Surface, SwarmConfig};
use tracing::{debug, info};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlCanvasElement, HtmlElement, KeyboardEvent,
    ScrollBehavior, ScrollIntoViewOptions, TouchEvent, WheelEvent,
};

use super::canvas::{Canvas2dSurface, CanvasShapeHost};
use super::dom::{
    FrameLoop, PageClock, TimerPump, by_id, current_theme, has_intersection_observer, listen,
    observe_intersections, query, query_all, set_class, set_style, watch_theme, window,
};
use crate::error::WebError;
use crate::input::{DomInput, TouchPhase, modifier_bits};
use crate::options::dom;

struct Home {
    controller: TransitionController<CanvasShapeHost>,
    surface: Canvas2dSurface,
    section: HtmlElement,
    container: HtmlElement,
    sections: Vec<Element>,
}

impl Home {
    /// `None` when the viewport height cannot be read.
    fn current_section(&self) -> Option<usize> {
        let viewport_height = window()
            .ok()
            .and_then(|w| w.inner_height().ok())
            .and_then(|h| h.as_f64())?;
        let section = section_index(self.container.scroll_top() as f32, viewport_height as f32);
        if section.is_none() {
            debug!(viewport_height, "degenerate viewport; gestures pass through");
        }
        section
    }

    fn sync_surface(&mut self) {
        let viewport = self.controller.viewport();
        if self.surface.size() != viewport {
            self.surface.resize(viewport, 1.0);
        }
    }

    fn apply_commands(&mut self) {
        for command in self.controller.drain_commands() {
            match command {
                HostCommand::LockScroll => self.set_scroll_enabled(false),
                HostCommand::UnlockScroll => self.set_scroll_enabled(true),
                HostCommand::ScrollToSection(index) => self.scroll_to(index),
                HostCommand::Markers(markers) => {
                    for (flag, class) in Markers::CLASSES {
                        set_class(&self.section, class, markers.contains(flag));
                    }
                }
            }
        }
    }

    fn set_scroll_enabled(&self, enabled: bool) {
        let (overflow, snap) = if enabled {
            ("auto", "y mandatory")
        } else {
            ("hidden", "none")
        };
        set_style(&self.container, "overflow", overflow);
        set_style(&self.container, "scroll-snap-type", snap);
    }

    fn scroll_to(&self, index: usize) {
        let Some(target) = self.sections.get(index) else {
            debug!(index, "no section to scroll to");
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        target.scroll_into_view_with_scroll_into_view_options(&options);
    }

    /// Timers only; returns the next deadline.
    fn tick(&mut self, now: Duration) -> Option<Duration> {
        self.controller.tick(now);
        self.sync_surface();
        self.apply_commands();
        self.controller.next_deadline()
    }

    /// One animation frame; `false` once the loop should pause.
    fn frame(&mut self, now: Duration) -> bool {
        self.tick(now);
        if !self.controller.is_running() {
            return false;
        }
        self.controller.step(now);
        self.controller.render(&mut self.surface);
        true
    }

    fn gesture(&mut self, input: &DomInput, event: &Event, now: Duration) {
        let Some(input) = input.to_input_event() else {
            return;
        };
        let section = self.current_section();
        if self.controller.handle_input(&input, section, now).is_intercept() {
            event.prevent_default();
        }
        self.apply_commands();
    }
}

fn section_size(section: &HtmlElement) -> Size {
    Size::new(section.offset_width() as f32, section.offset_height() as f32)
}

/// Start the particle logo. Fails (and the effect stays off) when the
/// canvas, its context, the home section, the scroll container or the
/// text anchor is missing.
pub(crate) fn install(doc: &Document, config: SwarmConfig, clock: PageClock) -> Result<(), WebError> {
    let canvas: HtmlCanvasElement = by_id(doc, dom::PARTICLE_CANVAS)
        .map_err(|_| FxError::CanvasUnavailable(dom::PARTICLE_CANVAS))?;
    let section: HtmlElement = by_id(doc, dom::HOME_SECTION)?;
    let container: HtmlElement = query(doc, dom::SCROLL_CONTAINER)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| WebError::MissingElement(dom::SCROLL_CONTAINER.to_string()))?;
    let sections = query_all(doc, dom::SECTIONS);
    let anchor = doc.get_element_by_id(dom::TEXT_ANCHOR);

    let viewport = section_size(&section);
    let mut surface = Canvas2dSurface::new(canvas)?;
    surface.resize(viewport, 1.0);
    let host = CanvasShapeHost::new(doc, anchor, section.clone().into())?;
    let mut controller = TransitionController::start(config, host, viewport, clock.now())?;
    controller.set_theme(current_theme(doc));

    let home = Rc::new(RefCell::new(Home {
        controller,
        surface,
        section: section.clone(),
        container: container.clone(),
        sections,
    }));
    home.borrow_mut().apply_commands();

    let pump = {
        let home = Rc::clone(&home);
        TimerPump::new(clock, move |now| home.borrow_mut().tick(now))
    };
    pump.arm(home.borrow().controller.next_deadline());

    let frames = {
        let home = Rc::clone(&home);
        let pump = pump.clone();
        FrameLoop::new(clock, move |now| {
            let mut home = home.borrow_mut();
            let keep_going = home.frame(now);
            pump.arm(home.controller.next_deadline());
            keep_going
        })
    };
    frames.request();

    let gesture = {
        let home = Rc::clone(&home);
        let pump = pump.clone();
        move |input: DomInput, event: &Event| {
            let mut home = home.borrow_mut();
            home.gesture(&input, event, clock.now());
            pump.arm(home.controller.next_deadline());
        }
    };
    let gesture = Rc::new(gesture);

    let scroller: EventTarget = container.into();
    {
        let gesture = Rc::clone(&gesture);
        listen(&scroller, "wheel", false, move |ev: WheelEvent| {
            gesture(DomInput::Wheel { dy: ev.delta_y() as f32 }, &ev);
        })?;
    }
    for (name, phase, passive) in [
        ("touchstart", TouchPhase::Start, true),
        ("touchmove", TouchPhase::Move, false),
    ] {
        let gesture = Rc::clone(&gesture);
        listen(&scroller, name, passive, move |ev: TouchEvent| {
            let y = ev.touches().get(0).map(|t| t.client_y() as f32);
            gesture(DomInput::Touch { phase, y }, &ev);
        })?;
    }
    {
        let gesture = Rc::clone(&gesture);
        let doc_target: EventTarget = doc.clone().into();
        listen(&doc_target, "keydown", false, move |ev: KeyboardEvent| {
            let mods = modifier_bits(ev.shift_key(), ev.alt_key(), ev.ctrl_key(), ev.meta_key());
            gesture(DomInput::Key { key: ev.key(), mods }, &ev);
        })?;
    }

    {
        let home = Rc::clone(&home);
        let pump = pump.clone();
        let win: EventTarget = window()?.into();
        listen(&win, "resize", true, move |_: Event| {
            let mut home = home.borrow_mut();
            let size = section_size(&home.section);
            home.controller.resize(size, clock.now());
            pump.arm(home.controller.next_deadline());
        })?;
    }

    {
        let home = Rc::clone(&home);
        watch_theme(doc, move |theme| {
            home.borrow_mut().controller.set_theme(theme);
        })?;
    }

    if has_intersection_observer(&window()?) {
        let home = Rc::clone(&home);
        let frames = frames.clone();
        let target: Element = section.into();
        observe_intersections(&[target], &[0.0], None, move |entries, _| {
            let Some(entry) = entries.last() else {
                return;
            };
            let visible = entry.is_intersecting();
            home.borrow_mut().controller.set_visible(visible);
            if visible {
                frames.request();
            }
        })?;
    }

    info!(
        particles = home.borrow().controller.particles().len(),
        "home particle logo running"
    );
    Ok(())
}
