//! Property tests for page-state invariants.
//!
//! Verifies:
//! 1. Certificate navigation never leaves the catalogue and the counter
//!    always matches the detail index.
//! 2. Escaped text never contains a raw markup character.
//! 3. Section states change only on a differing classification.
//! 4. The navbar is never hidden at or above the hide offset.

use fupix_site::certificates::{CertificateViewer, ModalView};
use fupix_site::contact::escape_html;
use fupix_site::nav::{NAV_HIDE_OFFSET, NavbarState};
use fupix_site::reveal::{RevealConfig, RevealEvent, ScrollReveal, SectionSample};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Nav {
    Prev,
    Next,
    Swipe(f32),
    Lightbox,
    CloseLightbox,
    LightboxNext,
    LightboxPrev,
}

fn nav_strategy() -> impl Strategy<Value = Nav> {
    prop_oneof![
        Just(Nav::Prev),
        Just(Nav::Next),
        (-200.0f32..200.0).prop_map(Nav::Swipe),
        Just(Nav::Lightbox),
        Just(Nav::CloseLightbox),
        Just(Nav::LightboxNext),
        Just(Nav::LightboxPrev),
    ]
}

proptest! {
    #[test]
    fn navigation_stays_in_catalogue(start in 0usize..5, ops in prop::collection::vec(nav_strategy(), 0..40)) {
        let mut viewer = CertificateViewer::default();
        viewer.open();
        prop_assert!(viewer.show_detail(start));
        for op in ops {
            match op {
                Nav::Prev => { viewer.show_previous(); }
                Nav::Next => { viewer.show_next(); }
                Nav::Swipe(dx) => { viewer.handle_swipe(100.0, 100.0 + dx, viewer.lightbox().is_some()); }
                Nav::Lightbox => { viewer.open_lightbox(None); }
                Nav::CloseLightbox => viewer.close_lightbox(),
                Nav::LightboxNext => { viewer.lightbox_next(); }
                Nav::LightboxPrev => { viewer.lightbox_previous(); }
            }
            let ModalView::Detail(i) = viewer.view() else {
                return Err(TestCaseError::fail("left the detail view"));
            };
            prop_assert!(i < 5);
            prop_assert!(viewer.lightbox().is_none_or(|l| l < 5));
            let nav = viewer.nav_state(i);
            prop_assert_eq!(nav.counter, format!("{} / 5", i + 1));
            prop_assert_eq!(nav.prev_enabled, i > 0);
            prop_assert_eq!(nav.next_enabled, i < 4);
        }
    }

    #[test]
    fn escaped_text_has_no_markup(text in ".*") {
        let escaped = escape_html(&text);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        prop_assert!(!escaped.contains('"'));
        prop_assert!(!escaped.contains('\''));
    }

    #[test]
    fn section_events_only_on_change(
        samples in prop::collection::vec((any::<bool>(), 0.0f32..1.0, -1200.0f32..1200.0, 100.0f32..900.0), 1..30)
    ) {
        let vh = 800.0;
        let mut reveal = ScrollReveal::new(RevealConfig::default());
        let id = reveal.add_section(900.0, 1500.0, vh);
        reveal.drain_events();
        let mut state = reveal.section_state(id);
        for (hit, ratio, top, height) in samples {
            let sample = SectionSample {
                is_intersecting: hit,
                intersection_ratio: ratio,
                top,
                bottom: top + height,
                viewport_height: vh,
            };
            reveal.section_intersection(id, &sample);
            let events = reveal.drain_events();
            let now = reveal.section_state(id);
            if now == state {
                prop_assert!(events.is_empty());
            } else {
                prop_assert_eq!(events, vec![RevealEvent::Section(id, now.expect("registered"))]);
            }
            state = now;
        }
    }

    #[test]
    fn navbar_visible_near_top(offsets in prop::collection::vec(0.0f32..2000.0, 1..50)) {
        let mut nav = NavbarState::new();
        for top in offsets {
            nav.on_scroll(top);
            if top <= NAV_HIDE_OFFSET {
                prop_assert!(!nav.is_hidden());
            }
        }
    }
}
