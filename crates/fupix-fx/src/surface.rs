#![forbid(unsafe_code)]

//! Immediate-mode 2D draw target.
//!
//! Effects draw through [`Surface`] so the same render code targets a
//! browser canvas or the in-memory [`RecordingSurface`] used by tests and
//! benches.
//!
//! # Invariants
//!
//! - Effects never query a surface for pixels; drawing is write-only.
//! - Calls are recorded in submission order.

use fupix_core::geometry::{Size, Vec2};
use fupix_core::theme::{Rgb, Rgba};

/// A write-only 2D drawing target.
pub trait Surface {
    /// Drawable area in CSS pixels.
    fn size(&self) -> Size;

    /// Clear to transparent.
    fn clear(&mut self);

    /// Fill the whole surface with an opaque colour.
    fn fill_background(&mut self, color: Rgb) {
        let size = self.size();
        self.fill_rect(Vec2::ZERO, size, color.with_alpha(1.0));
    }

    /// Fill an axis-aligned rectangle with its top-left at `origin`.
    fn fill_rect(&mut self, origin: Vec2, size: Size, color: Rgba);

    /// Fill a circle.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    /// Stroke a straight segment.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);

    /// Set the shadow glow applied to subsequent fills and strokes.
    /// `blur == 0` disables it. Surfaces without glow support ignore this.
    fn set_glow(&mut self, _blur: f32, _color: Rgb) {}
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    Rect {
        origin: Vec2,
        size: Size,
        color: Rgba,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Rgba,
    },
    Glow {
        blur: f32,
        color: Rgb,
    },
}

/// A [`Surface`] that records every call.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Size,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    /// Change the reported size (simulates a canvas resize).
    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    /// All calls since the last [`take_ops`](Self::take_ops).
    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drain the recorded calls.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    #[must_use]
    pub fn rect_count(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::Rect { .. }))
    }

    #[must_use]
    pub fn circle_count(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::Circle { .. }))
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::Line { .. }))
    }

    fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Size, color: Rgba) {
        self.ops.push(DrawOp::Rect {
            origin,
            size,
            color,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn set_glow(&mut self, blur: f32, color: Rgb) {
        self.ops.push(DrawOp::Glow { blur, color });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut s = RecordingSurface::new(Size::new(10.0, 10.0));
        let c = Rgb::new(1, 2, 3).with_alpha(0.5);
        s.clear();
        s.fill_rect(Vec2::ZERO, Size::new(1.0, 1.0), c);
        s.stroke_line(Vec2::ZERO, Vec2::new(1.0, 1.0), 0.8, c);
        assert_eq!(s.ops().len(), 3);
        assert_eq!(s.ops()[0], DrawOp::Clear);
        assert_eq!(s.rect_count(), 1);
        assert_eq!(s.line_count(), 1);
        assert_eq!(s.take_ops().len(), 3);
        assert!(s.ops().is_empty());
    }

    #[test]
    fn background_covers_surface() {
        let mut s = RecordingSurface::new(Size::new(4.0, 3.0));
        s.fill_background(Rgb::from_hex(0xEEEEEE));
        match &s.ops()[0] {
            DrawOp::Rect { origin, size, color } => {
                assert_eq!(*origin, Vec2::ZERO);
                assert_eq!(*size, Size::new(4.0, 3.0));
                assert_eq!(color.alpha, 1.0);
            }
            other => panic!("unexpected op {other:?}"),
        }
    }
}
