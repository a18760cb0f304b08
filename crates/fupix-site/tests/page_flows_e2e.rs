//! End-to-end page flows for reveal, navbar, certificate viewer and
//! contact form.
//!
//! Verifies:
//! 1. Staggered card reveal shows each card once and raises connectors at
//!    the second visible card.
//! 2. The scrolling flag clears after the idle period following the last
//!    scroll event.
//! 3. Opening the viewer, drilling into a certificate, zooming and closing
//!    emits the expected effect sequence.
//! 4. A close request with the lightbox open leaves the modal open.
//! 5. A blank submission reports one error per required field in display
//!    order.

use std::time::Duration;

use fupix_core::event::{KeyCode, KeyEvent};
use fupix_site::certificates::{
    CertificateViewer, FocusPosition, FocusTarget, KeyOutcome, ModalView, ViewerEffect,
};
use fupix_site::contact::{
    ContactForm, ContactSubmission, ERROR_CODE_MIN_LENGTH, ERROR_CODE_REQUIRED, Field,
};
use fupix_site::nav::{ActiveSection, NavbarState};
use fupix_site::reveal::{RevealConfig, RevealEvent, ScrollReveal};
use pretty_assertions::assert_eq;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn card_reveal_raises_connectors_once() {
    let mut reveal = ScrollReveal::new(RevealConfig::default());
    let group = reveal.add_group();
    let cards: Vec<_> = (0..3).map(|_| reveal.add_element(Some(group))).collect();

    reveal.element_intersection(cards[0], true);
    assert!(!reveal.connectors_visible(group));
    reveal.element_intersection(cards[1], true);
    reveal.element_intersection(cards[2], true);
    // Unobserved after the first reveal.
    reveal.element_intersection(cards[0], true);

    assert_eq!(
        reveal.drain_events(),
        vec![
            RevealEvent::Show(cards[0]),
            RevealEvent::Unobserve(cards[0]),
            RevealEvent::Show(cards[1]),
            RevealEvent::Unobserve(cards[1]),
            RevealEvent::Connectors(group),
            RevealEvent::Show(cards[2]),
            RevealEvent::Unobserve(cards[2]),
        ]
    );
}

#[test]
fn scrolling_flag_clears_after_idle() {
    let mut reveal = ScrollReveal::new(RevealConfig::default());
    reveal.on_scroll(ms(0));
    reveal.on_scroll(ms(60));
    reveal.tick(ms(120));
    assert!(reveal.is_scrolling());
    assert_eq!(reveal.next_deadline(), Some(ms(160)));
    reveal.tick(ms(160));
    assert!(!reveal.is_scrolling());
    assert_eq!(
        reveal.drain_events(),
        vec![RevealEvent::Scrolling(true), RevealEvent::Scrolling(false)]
    );
}

#[test]
fn navbar_and_active_link_follow_scroll() {
    let mut nav = NavbarState::new();
    assert_eq!(nav.on_scroll(30.0), None);
    assert_eq!(nav.on_scroll(120.0), Some(true));
    assert_eq!(nav.on_scroll(80.0), Some(false));

    let mut active = ActiveSection::new();
    active.on_intersection("about", true);
    assert_eq!(active.active_href().as_deref(), Some("#about"));
}

#[test]
fn viewer_walkthrough_effects() {
    let mut viewer = CertificateViewer::default();
    viewer.open();
    assert!(viewer.show_detail(1));
    assert!(viewer.open_lightbox(None));
    assert_eq!(
        viewer.handle_key(&KeyEvent::new(KeyCode::Right), FocusPosition::Other),
        KeyOutcome::Handled
    );
    assert_eq!(viewer.lightbox(), Some(2));
    viewer.handle_key(&KeyEvent::new(KeyCode::Escape), FocusPosition::Other);
    viewer.handle_key(&KeyEvent::new(KeyCode::Escape), FocusPosition::Other);
    assert_eq!(viewer.view(), ModalView::Gallery);
    viewer.handle_key(&KeyEvent::new(KeyCode::Escape), FocusPosition::Other);

    assert_eq!(
        viewer.drain_effects(),
        vec![
            ViewerEffect::LockBodyScroll,
            ViewerEffect::Focus(FocusTarget::FirstCard),
            ViewerEffect::Focus(FocusTarget::BackButton),
            ViewerEffect::Focus(FocusTarget::DetailImage),
            ViewerEffect::UnlockBodyScroll,
            ViewerEffect::Focus(FocusTarget::Opener),
        ]
    );
    assert!(!viewer.is_open());
}

#[test]
fn close_with_lightbox_keeps_modal() {
    let mut viewer = CertificateViewer::default();
    viewer.open();
    viewer.show_detail(4);
    viewer.open_lightbox(None);
    viewer.close();
    assert_eq!(viewer.lightbox(), None);
    assert_eq!(viewer.view(), ModalView::Detail(4));
    assert!(viewer.is_open());
}

#[test]
fn blank_submission_reports_required_fields() {
    let form = ContactForm::default();
    let errors = form.validate(&ContactSubmission::default());
    let summary: Vec<_> = errors.iter().map(|(f, e)| (*f, e.code)).collect();
    assert_eq!(
        summary,
        vec![
            (Field::Name, ERROR_CODE_REQUIRED),
            (Field::Email, ERROR_CODE_REQUIRED),
            (Field::Subject, ERROR_CODE_REQUIRED),
            (Field::Message, ERROR_CODE_REQUIRED),
        ]
    );
}

#[test]
fn submission_from_json_validates() {
    let submission: ContactSubmission = serde_json::from_str(
        r#"{"name":"A","email":"ana@example.com","subject":"Hi","message":"Hello there, team"}"#,
    )
    .expect("valid json");
    let errors = ContactForm::default().validate(&submission);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, Field::Name);
    assert_eq!(errors[0].1.code, ERROR_CODE_MIN_LENGTH);
    assert_eq!(errors[0].1.to_string(), "Must be at least 2 characters");
}
