#![forbid(unsafe_code)]

//! Decorative canvases: the plexus network and the grid tunnel.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use fupix_core::geometry::{Size, Vec2};
use fupix_core::timer::Debounce;
use fupix_fx::gridbox::GridBackdrop;
use fupix_fx::plexus::PlexusField;
use fupix_fx::{FxError, GridboxConfig, PlexusConfig};
use tracing::{info, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlCanvasElement, HtmlElement, MouseEvent};

use super::canvas::Canvas2dSurface;
use super::dom::{
    FrameLoop, PageClock, TimerPump, by_id, current_theme, has_intersection_observer, listen,
    observe_intersections, query, query_all, set_class, watch_theme, window,
};
use crate::error::WebError;
use crate::options::dom;

const PLEXUS_RESIZE_QUIET: Duration = Duration::from_millis(200);

fn device_pixel_ratio() -> f64 {
    window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0)
}

fn window_size() -> Size {
    let Ok(win) = window() else {
        return Size::default();
    };
    let read = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    Size::new(read(win.inner_width()), read(win.inner_height()))
}

// ---------------------------------------------------------------------------
// Plexus
// ---------------------------------------------------------------------------

struct Plexus {
    field: PlexusField,
    surface: Canvas2dSurface,
    section: HtmlElement,
    resize: Debounce<()>,
}

impl Plexus {
    fn fit(&mut self) {
        let rect = self.section.get_bounding_client_rect();
        let size = Size::new(rect.width() as f32, rect.height() as f32);
        self.surface.resize(size, device_pixel_ratio());
        self.field.resize(size);
    }
}

/// Start the plexus network in the detail section.
pub(crate) fn install_plexus(doc: &Document, config: PlexusConfig, clock: PageClock) -> Result<(), WebError> {
    let canvas: HtmlCanvasElement = by_id(doc, dom::PLEXUS_CANVAS)
        .map_err(|_| FxError::CanvasUnavailable(dom::PLEXUS_CANVAS))?;
    let section: HtmlElement = by_id(doc, dom::PLEXUS_SECTION)?;
    let surface = Canvas2dSurface::new(canvas)?;
    let mut field = PlexusField::new(config, Size::default());
    field.set_theme(current_theme(doc));

    let observed = has_intersection_observer(&window()?);
    field.set_visible(!observed);
    let plexus = Rc::new(RefCell::new(Plexus {
        field,
        surface,
        section: section.clone(),
        resize: Debounce::new(PLEXUS_RESIZE_QUIET),
    }));
    plexus.borrow_mut().fit();

    let frames = {
        let plexus = Rc::clone(&plexus);
        FrameLoop::new(clock, move |now| {
            let mut plexus = plexus.borrow_mut();
            let Plexus { field, surface, .. } = &mut *plexus;
            field.frame(now, surface);
            field.is_running()
        })
    };

    let pump = {
        let plexus = Rc::clone(&plexus);
        TimerPump::new(clock, move |now| {
            let mut plexus = plexus.borrow_mut();
            if plexus.resize.poll(now).is_some() {
                plexus.fit();
            }
            plexus.resize.deadline()
        })
    };

    let win: EventTarget = window()?.into();
    {
        let plexus = Rc::clone(&plexus);
        listen(&win, "resize", true, move |_: Event| {
            let mut plexus = plexus.borrow_mut();
            plexus.resize.push(clock.now(), ());
            pump.arm(plexus.resize.deadline());
        })?;
    }
    {
        let plexus = Rc::clone(&plexus);
        listen(&win, "mousemove", true, move |ev: MouseEvent| {
            let mut plexus = plexus.borrow_mut();
            let rect = plexus.surface.canvas().get_bounding_client_rect();
            let at = Vec2::new(
                (f64::from(ev.client_x()) - rect.left()) as f32,
                (f64::from(ev.client_y()) - rect.top()) as f32,
            );
            plexus.field.pointer_moved(at);
        })?;
    }
    {
        let plexus = Rc::clone(&plexus);
        listen(&win, "mouseleave", true, move |_: Event| {
            plexus.borrow_mut().field.pointer_left();
        })?;
    }
    {
        let plexus = Rc::clone(&plexus);
        watch_theme(doc, move |theme| plexus.borrow_mut().field.set_theme(theme))?;
    }

    if observed {
        let plexus = Rc::clone(&plexus);
        let frames = frames.clone();
        let target: Element = section.into();
        observe_intersections(&[target], &[0.1], None, move |entries, _| {
            let Some(entry) = entries.last() else {
                return;
            };
            let visible = entry.is_intersecting();
            {
                let mut plexus = plexus.borrow_mut();
                let resumed = visible && !plexus.field.is_running();
                plexus.field.set_visible(visible);
                if resumed {
                    plexus.fit();
                }
            }
            if visible {
                frames.request();
            }
        })?;
    } else {
        frames.request();
    }

    info!(nodes = plexus.borrow().field.nodes().len(), "plexus running");
    Ok(())
}

// ---------------------------------------------------------------------------
// Grid tunnel
// ---------------------------------------------------------------------------

struct Grid {
    backdrop: GridBackdrop,
    surface: Canvas2dSurface,
}

/// Insert the grid canvas behind the page and show it while any
/// `.gridbox-section` is on screen. A second call finds the canvas already
/// present and does nothing.
pub(crate) fn install_gridbox(doc: &Document, config: GridboxConfig, clock: PageClock) -> Result<(), WebError> {
    let sections = query_all(doc, dom::GRIDBOX_SECTIONS);
    if sections.is_empty() {
        warn!("no grid sections; grid backdrop disabled");
        return Ok(());
    }
    if query(doc, &format!(".{}", dom::GRIDBOX_CANVAS_CLASS)).is_some() {
        return Ok(());
    }
    let body = doc.body().ok_or(WebError::NoDocument)?;
    let canvas = doc
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| FxError::CanvasUnavailable(dom::GRIDBOX_CANVAS_CLASS))?;
    canvas.set_class_name(dom::GRIDBOX_CANVAS_CLASS);
    body.insert_before(&canvas, body.first_child().as_ref())?;

    let viewport = window_size();
    let mut surface = Canvas2dSurface::new(canvas.clone())?;
    surface.resize(viewport, device_pixel_ratio());
    let grid = Rc::new(RefCell::new(Grid {
        backdrop: GridBackdrop::new(config, viewport, current_theme(doc)),
        surface,
    }));

    let frames = {
        let grid = Rc::clone(&grid);
        FrameLoop::new(clock, move |_| {
            let mut grid = grid.borrow_mut();
            let Grid { backdrop, surface } = &mut *grid;
            backdrop.frame(surface);
            backdrop.is_visible()
        })
    };

    {
        let grid = Rc::clone(&grid);
        let win: EventTarget = window()?.into();
        listen(&win, "resize", true, move |_: Event| {
            let mut grid = grid.borrow_mut();
            let viewport = window_size();
            grid.surface.resize(viewport, device_pixel_ratio());
            grid.backdrop.resize(viewport);
        })?;
    }
    {
        let grid = Rc::clone(&grid);
        watch_theme(doc, move |theme| grid.borrow_mut().backdrop.set_theme(theme))?;
    }

    if has_intersection_observer(&window()?) {
        let grid = Rc::clone(&grid);
        let canvas: Element = canvas.into();
        observe_intersections(&sections, &[0.1], None, move |entries, _| {
            let mut flipped = None;
            {
                let mut grid = grid.borrow_mut();
                for entry in &entries {
                    if let Some(visible) = grid.backdrop.observe_section(entry.is_intersecting()) {
                        flipped = Some(visible);
                    }
                }
            }
            if let Some(visible) = flipped {
                set_class(&canvas, "visible", visible);
                if visible {
                    frames.request();
                }
            }
        })?;
    } else {
        grid.borrow_mut().backdrop.observe_section(true);
        set_class(&canvas, "visible", true);
        frames.request();
    }

    info!(sections = sections.len(), "grid backdrop ready");
    Ok(())
}
