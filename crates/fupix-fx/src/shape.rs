#![forbid(unsafe_code)]

//! Text shape sampling.
//!
//! The logo is rendered once into an off-screen alpha mask and every
//! sufficiently opaque pixel on a regular stride becomes a particle target.
//!
//! # Invariants
//!
//! - Samples are emitted in row-major order (y, then x).
//! - A pixel is kept iff its alpha is strictly greater than the threshold.
//! - A missing anchor or a failed rasterization yields an empty sample set,
//!   never an error.

use fupix_core::geometry::{PixelPoint, Rect, Size};
use tracing::{debug, warn};

use crate::config::SwarmConfig;
use crate::error::FxError;

/// Distance between the headline's vertical centre and the anchor's centre.
const MAIN_LINE_RAISE: f32 = 20.0;
/// Sub-label size relative to the headline.
const SUB_SCALE: f32 = 0.35;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// One right-aligned, vertically centred line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub font_px: f32,
    pub weight: u16,
    pub family: String,
    /// Right edge of the rendered text.
    pub right: f32,
    /// Vertical centre (`textBaseline = middle`).
    pub center_y: f32,
}

impl TextLine {
    /// CSS `font` shorthand, e.g. `900 120px "Orbitron", sans-serif`.
    #[must_use]
    pub fn css_font(&self) -> String {
        // Hundredths keep f32 noise such as 120.00001 out of the CSS string.
        let px = (self.font_px * 100.0).round() / 100.0;
        format!("{} {}px {}", self.weight, px, self.family)
    }
}

/// Placement of the headline and sub-label inside the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub main: TextLine,
    pub sub: TextLine,
}

impl TextLayout {
    /// Lay out both lines against `anchor`, given relative to the canvas.
    #[must_use]
    pub fn compute(config: &SwarmConfig, canvas: Size, anchor: Rect) -> Self {
        let main_px = (canvas.width * 0.15).clamp(60.0, 250.0);
        let sub_px = main_px * SUB_SCALE;
        let right = anchor.right() - config.anchor_inset;
        let center_y = anchor.center_y();
        Self {
            main: TextLine {
                text: config.text_main.clone(),
                font_px: main_px,
                weight: config.weight_main,
                family: config.font_main.clone(),
                right,
                center_y: center_y - MAIN_LINE_RAISE,
            },
            sub: TextLine {
                text: config.text_sub.clone(),
                font_px: sub_px,
                weight: config.weight_sub,
                family: config.font_sub.clone(),
                right,
                center_y: center_y + main_px * 0.5,
            },
        }
    }

    pub fn lines(&self) -> [&TextLine; 2] {
        [&self.main, &self.sub]
    }
}

// ---------------------------------------------------------------------------
// Mask
// ---------------------------------------------------------------------------

/// Single-channel coverage buffer, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl AlphaMask {
    /// Fully transparent mask.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width as usize * height as usize],
        }
    }

    /// Extract the alpha channel of an RGBA8 buffer (`ImageData.data`).
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, FxError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(FxError::Rasterize(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            alpha: rgba.chunks_exact(4).map(|px| px[3]).collect(),
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Alpha at `(x, y)`; out of bounds reads as transparent.
    #[must_use]
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.alpha[y as usize * self.width as usize + x as usize]
    }

    /// Fill the pixel span `[x0, x1) x [y0, y1)`, clipped to the mask.
    pub fn fill(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, alpha: u8) {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        let w = self.width as usize;
        for y in y0..y1 {
            let row = y as usize * w;
            for x in x0..x1 {
                self.alpha[row + x as usize] = alpha;
            }
        }
    }
}

/// Collect every `gap`-th pixel (both axes) whose alpha exceeds `threshold`.
#[must_use]
pub fn sample_mask(mask: &AlphaMask, gap: u32, threshold: u8) -> Vec<PixelPoint> {
    let step = gap.max(1) as usize;
    let mut points = Vec::new();
    for y in (0..mask.height).step_by(step) {
        for x in (0..mask.width).step_by(step) {
            if mask.alpha_at(x, y) > threshold {
                points.push(PixelPoint::new(x, y));
            }
        }
    }
    points
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// Where the text goes and how it becomes pixels.
pub trait ShapeHost {
    /// The text anchor relative to the canvas, or `None` if it is missing.
    fn anchor(&self) -> Option<Rect>;

    /// Render `layout` into a mask of `canvas` size.
    fn rasterize(&mut self, canvas: Size, layout: &TextLayout) -> Result<AlphaMask, FxError>;
}

/// Sample the configured text for a canvas of the given size.
pub fn sample_shape<H: ShapeHost + ?Sized>(
    config: &SwarmConfig,
    host: &mut H,
    canvas: Size,
) -> Vec<PixelPoint> {
    let Some(anchor) = host.anchor() else {
        warn!("text anchor missing; no shape sampled");
        return Vec::new();
    };
    if canvas.is_empty() {
        return Vec::new();
    }
    let layout = TextLayout::compute(config, canvas, anchor);
    match host.rasterize(canvas, &layout) {
        Ok(mask) => {
            let points = sample_mask(&mask, config.particle_gap, config.alpha_threshold);
            debug!(
                points = points.len(),
                width = canvas.width,
                height = canvas.height,
                "shape sampled"
            );
            points
        }
        Err(err) => {
            warn!(%err, "shape rasterization failed");
            Vec::new()
        }
    }
}

/// Font-free rasterizer: every non-space glyph is a solid block.
///
/// Advance is `0.6 em`, ink `0.5 em` wide and `0.7 em` tall around the
/// line's centre. Used natively and in tests where no font engine exists.
#[derive(Debug, Clone, Default)]
pub struct GlyphBlockHost {
    anchor: Option<Rect>,
    rasterized: usize,
}

impl GlyphBlockHost {
    #[must_use]
    pub fn new(anchor: Option<Rect>) -> Self {
        Self {
            anchor,
            rasterized: 0,
        }
    }

    pub fn set_anchor(&mut self, anchor: Option<Rect>) {
        self.anchor = anchor;
    }

    /// How many masks have been produced.
    #[must_use]
    pub fn rasterize_count(&self) -> usize {
        self.rasterized
    }

    fn draw_line(mask: &mut AlphaMask, line: &TextLine) {
        let advance = line.font_px * 0.6;
        let ink = line.font_px * 0.5;
        let half_height = line.font_px * 0.35;
        let glyphs = line.text.chars().count() as f32;
        let left = line.right - glyphs * advance;
        let y0 = to_px(line.center_y - half_height);
        let y1 = to_px(line.center_y + half_height);
        for (i, ch) in line.text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x0 = left + i as f32 * advance;
            mask.fill(to_px(x0), y0, to_px(x0 + ink), y1, 255);
        }
    }
}

fn to_px(v: f32) -> u32 {
    v.max(0.0).ceil() as u32
}

impl ShapeHost for GlyphBlockHost {
    fn anchor(&self) -> Option<Rect> {
        self.anchor
    }

    fn rasterize(&mut self, canvas: Size, layout: &TextLayout) -> Result<AlphaMask, FxError> {
        let (width, height) = canvas.to_pixels();
        let mut mask = AlphaMask::new(width, height);
        for line in layout.lines() {
            Self::draw_line(&mut mask, line);
        }
        self.rasterized += 1;
        Ok(mask)
    }
}
