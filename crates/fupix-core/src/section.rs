#![forbid(unsafe_code)]

//! Viewport section signal.
//!
//! The page is a vertical stack of full-height panels inside a scroll
//! container. The "current section" is the panel nearest the container's
//! scroll offset.

/// Index of the panel nearest to `scroll_top`.
///
/// A negative (overscrolled) offset is the first panel. A zero, negative or
/// non-finite viewport height, or a non-finite offset, has no section.
#[must_use]
pub fn section_index(scroll_top: f32, viewport_height: f32) -> Option<usize> {
    if !viewport_height.is_finite() || viewport_height <= 0.0 || !scroll_top.is_finite() {
        return None;
    }
    if scroll_top <= 0.0 {
        return Some(0);
    }
    Some((scroll_top / viewport_height).round() as usize)
}
