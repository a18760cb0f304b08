//! JSON subscriber installation for native runs.
//!
//! Verifies:
//! 1. The first install succeeds and a second one reports the existing subscriber.
//! 2. Effect code logs through the installed subscriber without panicking.

use std::time::Duration;

use fupix_core::geometry::{Rect, Size};
use fupix_core::logging::init_json_subscriber;
use fupix_fx::SwarmConfig;
use fupix_fx::shape::GlyphBlockHost;
use fupix_fx::swarm::TransitionController;

#[test]
fn json_subscriber_installs_once_and_receives_effect_logs() {
    assert!(init_json_subscriber());
    assert!(!init_json_subscriber());

    let view = Size::new(640.0, 480.0);
    let host = GlyphBlockHost::new(Some(Rect::from_size(view)));
    let mut swarm =
        TransitionController::start(SwarmConfig::default(), host, view, Duration::ZERO)
            .expect("anchor present");
    swarm.tick(Duration::from_millis(3500));
    assert!(!swarm.particles().is_empty());
}
