#![forbid(unsafe_code)]

//! Error type for effect setup.
//!
//! None of these are surfaced to visitors: a failing effect logs and stays
//! off for the lifetime of the page.

use std::fmt;

/// Why an effect could not be started or configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FxError {
    /// The target `<canvas>` element does not exist.
    CanvasUnavailable(&'static str),
    /// The canvas exists but has no 2D context.
    ContextUnavailable,
    /// The element the logo text is aligned to does not exist.
    AnchorMissing(&'static str),
    /// Off-screen text rendering failed.
    Rasterize(String),
    /// Options could not be parsed.
    Config(String),
}

impl fmt::Display for FxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CanvasUnavailable(id) => write!(f, "canvas not found: #{id}"),
            Self::ContextUnavailable => f.write_str("2d canvas context unavailable"),
            Self::AnchorMissing(id) => write!(f, "text anchor not found: #{id}"),
            Self::Rasterize(msg) => write!(f, "text rasterization failed: {msg}"),
            Self::Config(msg) => write!(f, "invalid effect options: {msg}"),
        }
    }
}

impl std::error::Error for FxError {}

impl From<serde_json::Error> for FxError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_missing_element() {
        assert_eq!(
            FxError::AnchorMissing("textTarget").to_string(),
            "text anchor not found: #textTarget"
        );
        assert_eq!(
            FxError::CanvasUnavailable("particleCanvas").to_string(),
            "canvas not found: #particleCanvas"
        );
    }

    #[test]
    fn json_errors_become_config_errors() {
        let err: FxError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, FxError::Config(_)));
    }
}
