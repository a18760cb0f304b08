#![forbid(unsafe_code)]

//! Page behaviour for the Fupix site.
//!
//! Each module is a small state machine fed by host observations
//! (intersections, scroll offsets, keys, form input) that reports what the
//! page should change. Nothing here touches the DOM.

pub mod certificates;
pub mod contact;
pub mod nav;
pub mod reveal;

pub use certificates::{CERTIFICATES, Certificate, CertificateViewer};
pub use contact::{ContactConfig, ContactForm, ValidationError};
pub use nav::{ActiveSection, NavbarState};
pub use reveal::{RevealConfig, ScrollReveal, SectionState};
