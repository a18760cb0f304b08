#![forbid(unsafe_code)]

//! Canvas 2D backends for the effect traits.

use std::f64::consts::TAU;

use fupix_core::geometry::{Rect, Size, Vec2};
use fupix_core::theme::{Rgb, Rgba};
use fupix_fx::shape::{AlphaMask, ShapeHost, TextLayout};
use fupix_fx::{FxError, Surface};
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement};

use super::dom::set_style;

/// The `2d` context of `canvas`.
pub(crate) fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, FxError> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
        .ok_or(FxError::ContextUnavailable)
}

/// Draws into a `<canvas>` through its 2D context.
///
/// Sizes are CSS pixels; with a device pixel ratio above one the backing
/// store is scaled up and the context transform compensates.
pub(crate) struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    size: Size,
    dpr: f64,
}

impl Canvas2dSurface {
    pub(crate) fn new(canvas: HtmlCanvasElement) -> Result<Self, FxError> {
        let ctx = context_2d(&canvas)?;
        Ok(Self {
            canvas,
            ctx,
            size: Size::default(),
            dpr: 1.0,
        })
    }

    pub(crate) fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Resize the backing store to `size` CSS pixels at `dpr`.
    pub(crate) fn resize(&mut self, size: Size, dpr: f64) {
        let dpr = if dpr.is_finite() { dpr.max(1.0) } else { 1.0 };
        self.size = size;
        self.dpr = dpr;
        let width = (f64::from(size.width) * dpr).floor().max(0.0) as u32;
        let height = (f64::from(size.height) * dpr).floor().max(0.0) as u32;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        if dpr > 1.0 {
            set_style(&self.canvas, "width", &format!("{}px", size.width));
            set_style(&self.canvas, "height", &format!("{}px", size.height));
        }
        if let Err(err) = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0) {
            warn!(?err, "canvas transform failed");
        }
    }
}

impl Surface for Canvas2dSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            f64::from(self.size.width),
            f64::from(self.size.height),
        );
    }

    fn fill_rect(&mut self, origin: Vec2, size: Size, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(
            f64::from(origin.x),
            f64::from(origin.y),
            f64::from(size.width),
            f64::from(size.height),
        );
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        if self
            .ctx
            .arc(f64::from(center.x), f64::from(center.y), f64::from(radius), 0.0, TAU)
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(f64::from(width));
        self.ctx.begin_path();
        self.ctx.move_to(f64::from(from.x), f64::from(from.y));
        self.ctx.line_to(f64::from(to.x), f64::from(to.y));
        self.ctx.stroke();
    }

    fn set_glow(&mut self, blur: f32, color: Rgb) {
        self.ctx.set_shadow_blur(f64::from(blur));
        self.ctx.set_shadow_color(&color.to_css());
    }
}

// ---------------------------------------------------------------------------
// Text rasterization
// ---------------------------------------------------------------------------

/// Renders logo text into an off-screen canvas and reads back its alpha.
///
/// The anchor is re-measured on every call so resizes and layout shifts
/// are picked up.
pub(crate) struct CanvasShapeHost {
    anchor: Option<Element>,
    section: Element,
    scratch: HtmlCanvasElement,
}

impl CanvasShapeHost {
    pub(crate) fn new(doc: &Document, anchor: Option<Element>, section: Element) -> Result<Self, FxError> {
        let scratch = doc
            .create_element("canvas")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or(FxError::CanvasUnavailable("scratch"))?;
        Ok(Self {
            anchor,
            section,
            scratch,
        })
    }
}

fn client_rect(el: &Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect::new(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32)
}

impl ShapeHost for CanvasShapeHost {
    fn anchor(&self) -> Option<Rect> {
        let anchor = self.anchor.as_ref()?;
        Some(client_rect(anchor).relative_to(&client_rect(&self.section)))
    }

    fn rasterize(&mut self, canvas: Size, layout: &TextLayout) -> Result<AlphaMask, FxError> {
        let (width, height) = canvas.to_pixels();
        self.scratch.set_width(width);
        self.scratch.set_height(height);
        let ctx = context_2d(&self.scratch)?;
        ctx.clear_rect(0.0, 0.0, f64::from(width), f64::from(height));
        ctx.set_fill_style_str("#ffffff");
        ctx.set_text_align("right");
        ctx.set_text_baseline("middle");
        for line in layout.lines() {
            ctx.set_font(&line.css_font());
            ctx.fill_text(&line.text, f64::from(line.right), f64::from(line.center_y))
                .map_err(|err| FxError::Rasterize(format!("{err:?}")))?;
        }
        let image = ctx
            .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
            .map_err(|err| FxError::Rasterize(format!("{err:?}")))?;
        AlphaMask::from_rgba(width, height, &image.data().0)
    }
}
