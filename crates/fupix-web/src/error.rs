#![forbid(unsafe_code)]

//! Frontend error type.
//!
//! Components log these and stay disabled; they only become a `JsValue` at
//! the exported API.

use std::fmt;

use fupix_fx::FxError;

/// Why a page component could not start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebError {
    /// `window` or `document` is not available (non-browser host).
    NoDocument,
    /// A required element is missing.
    MissingElement(String),
    /// A DOM call threw.
    Dom(String),
    /// Effect setup failed.
    Fx(FxError),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDocument => f.write_str("no window/document available"),
            Self::MissingElement(selector) => write!(f, "element not found: {selector}"),
            Self::Dom(msg) => write!(f, "DOM call failed: {msg}"),
            Self::Fx(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for WebError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fx(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FxError> for WebError {
    fn from(err: FxError) -> Self {
        Self::Fx(err)
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for WebError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Self::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<WebError> for wasm_bindgen::JsValue {
    fn from(err: WebError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fx_errors_keep_their_message() {
        let err = WebError::from(FxError::AnchorMissing("textTarget"));
        assert_eq!(err.to_string(), "text anchor not found: #textTarget");
        assert!(std::error::Error::source(&err).is_some());
    }
}
