//! End-to-end lifecycle scenarios for the particle transition controller.
//!
//! Verifies:
//! 1. With no input the swarm reaches `Assembled` at the ready delay with
//!    scroll unlocked.
//! 2. A forward wheel on the home panel disperses immediately, locks
//!    scrolling, then unlocks and scrolls to the next panel.
//! 3. A backward key on the next panel scrolls home and reassembles.
//! 4. A forward gesture on any other panel changes nothing.
//! 5. Resampling after a resize scales the particle count with the viewport.

use std::time::Duration;

use fupix_core::event::{InputEvent, KeyCode, KeyEvent};
use fupix_core::geometry::{Rect, Size};
use fupix_fx::shape::GlyphBlockHost;
use fupix_fx::swarm::{GestureResponse, HostCommand, Markers, Stage, TransitionController};
use fupix_fx::{RecordingSurface, SwarmConfig};
use pretty_assertions::assert_eq;

const VIEW: Size = Size::new(800.0, 600.0);

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn start(view: Size) -> TransitionController<GlyphBlockHost> {
    let host = GlyphBlockHost::new(Some(Rect::from_size(view)));
    TransitionController::start(SwarmConfig::default(), host, view, Duration::ZERO)
        .expect("anchor present")
}

/// Run animation frames every 16 ms up to and including `until`.
fn run_frames(
    swarm: &mut TransitionController<GlyphBlockHost>,
    from: Duration,
    until: Duration,
) {
    let mut surface = RecordingSurface::new(swarm.viewport());
    let mut t = from;
    while t <= until {
        swarm.frame(t, &mut surface);
        surface.take_ops();
        t += ms(16);
    }
    swarm.tick(until);
}

fn assembled() -> TransitionController<GlyphBlockHost> {
    let mut swarm = start(VIEW);
    swarm.tick(ms(3500));
    swarm.drain_commands();
    swarm
}

fn dispersed() -> TransitionController<GlyphBlockHost> {
    let mut swarm = assembled();
    swarm.handle_input(&InputEvent::Wheel { delta_y: 100.0 }, Some(0), ms(4000));
    swarm.tick(ms(6000));
    swarm.drain_commands();
    swarm
}

#[test]
fn scenario_idle_reaches_assembled() {
    let mut swarm = start(VIEW);
    run_frames(&mut swarm, Duration::ZERO, ms(3500));
    assert_eq!(swarm.stage(), Stage::Assembled);
    assert!(!swarm.is_scroll_locked());
    assert_eq!(
        swarm.drain_commands(),
        vec![
            HostCommand::Markers(Markers::READY),
            HostCommand::Markers(Markers::READY | Markers::LOGO_VISIBLE),
            HostCommand::Markers(Markers::READY | Markers::LOGO_VISIBLE | Markers::SCROLL_READY),
        ]
    );
    assert!(swarm.particles().iter().all(|p| p.is_active()));
}

#[test]
fn scenario_forward_wheel_disperses_then_scrolls() {
    let mut swarm = assembled();
    let response = swarm.handle_input(&InputEvent::Wheel { delta_y: 100.0 }, Some(0), ms(4000));
    assert_eq!(response, GestureResponse::Intercept);
    assert_eq!(swarm.stage(), Stage::Dispersing);
    assert!(swarm.is_scroll_locked());
    assert_eq!(
        swarm.drain_commands(),
        vec![
            HostCommand::Markers(Markers::READY | Markers::UI_HIDDEN),
            HostCommand::LockScroll,
        ]
    );

    swarm.tick(ms(5499));
    assert_eq!(swarm.stage(), Stage::Dispersing);
    swarm.tick(ms(5500));
    assert_eq!(swarm.stage(), Stage::Settling);
    assert!(swarm.is_in_flight());
    assert_eq!(
        swarm.drain_commands(),
        vec![HostCommand::UnlockScroll, HostCommand::ScrollToSection(1)]
    );

    swarm.tick(ms(6000));
    assert_eq!(swarm.stage(), Stage::Dispersed);
    assert!(!swarm.is_in_flight());
    assert!(swarm.drain_commands().is_empty());
}

#[test]
fn scenario_arrow_up_reassembles() {
    let mut swarm = dispersed();
    let key = InputEvent::Key(KeyEvent::new(KeyCode::Up));
    assert!(swarm.handle_input(&key, Some(1), ms(7000)).is_intercept());
    assert_eq!(swarm.stage(), Stage::Returning);
    assert!(swarm.is_scroll_locked());
    assert_eq!(
        swarm.drain_commands(),
        vec![HostCommand::LockScroll, HostCommand::ScrollToSection(0)]
    );

    swarm.tick(ms(7300));
    assert_eq!(swarm.stage(), Stage::Reassembling);
    assert_eq!(
        swarm.drain_commands(),
        vec![HostCommand::Markers(Markers::READY)]
    );
    assert!(swarm.particles().iter().all(|p| p.is_active()));

    swarm.tick(ms(9100));
    assert_eq!(swarm.stage(), Stage::Assembled);
    assert!(!swarm.is_scroll_locked());
    assert_eq!(
        swarm.drain_commands(),
        vec![
            HostCommand::Markers(Markers::READY | Markers::LOGO_VISIBLE | Markers::SCROLL_READY),
            HostCommand::UnlockScroll,
        ]
    );
}

#[test]
fn scenario_gesture_in_third_section_is_ignored() {
    let mut swarm = assembled();
    let inputs = [
        InputEvent::Wheel { delta_y: 100.0 },
        InputEvent::Key(KeyEvent::new(KeyCode::Down)),
        InputEvent::Key(KeyEvent::new(KeyCode::Char(' '))),
        InputEvent::Key(KeyEvent::new(KeyCode::PageDown)),
    ];
    for input in &inputs {
        assert_eq!(
            swarm.handle_input(input, Some(2), ms(4000)),
            GestureResponse::PassThrough
        );
    }
    assert_eq!(swarm.stage(), Stage::Assembled);
    assert!(swarm.drain_commands().is_empty());
}

#[test]
fn gestures_during_flight_pass_through() {
    let mut swarm = assembled();
    swarm.handle_input(&InputEvent::Wheel { delta_y: 100.0 }, Some(0), ms(4000));
    swarm.drain_commands();
    for section in 0..3 {
        for delta_y in [-100.0, 100.0] {
            let r = swarm.handle_input(&InputEvent::Wheel { delta_y }, Some(section), ms(4500));
            assert_eq!(r, GestureResponse::PassThrough);
        }
    }
    swarm.tick(ms(5500));
    // Settling: the smooth scroll is still running.
    let r = swarm.handle_input(&InputEvent::Wheel { delta_y: -100.0 }, Some(1), ms(5600));
    assert_eq!(r, GestureResponse::PassThrough);
    assert_eq!(swarm.stage(), Stage::Settling);
}

#[test]
fn targets_survive_a_full_cycle() {
    let mut swarm = start(VIEW);
    let targets: Vec<_> = swarm.particles().iter().map(|p| p.target()).collect();
    run_frames(&mut swarm, Duration::ZERO, ms(3500));
    swarm.handle_input(&InputEvent::Wheel { delta_y: 1.0 }, Some(0), ms(3600));
    run_frames(&mut swarm, ms(3600), ms(6100));
    swarm.handle_input(&InputEvent::Wheel { delta_y: -1.0 }, Some(1), ms(6200));
    run_frames(&mut swarm, ms(6200), ms(8400));
    assert_eq!(swarm.stage(), Stage::Assembled);
    let after: Vec<_> = swarm.particles().iter().map(|p| p.target()).collect();
    assert_eq!(targets, after);
}

#[test]
fn resampling_scales_with_viewport() {
    let mut counts = Vec::new();
    let mut swarm = start(Size::new(320.0, 240.0));
    counts.push(swarm.particles().len());
    let mut now = ms(4000);
    for view in [Size::new(640.0, 480.0), Size::new(800.0, 600.0)] {
        swarm.host_mut().set_anchor(Some(Rect::from_size(view)));
        swarm.resize(view, now);
        now += ms(300);
        swarm.tick(now);
        assert_eq!(swarm.viewport(), view);
        counts.push(swarm.particles().len());
        now += ms(1000);
    }
    assert!(counts.windows(2).all(|w| w[0] < w[1]), "counts {counts:?}");
}

#[test]
fn large_viewports_are_decimated() {
    let swarm = start(Size::new(1280.0, 720.0));
    let full = {
        let cfg = SwarmConfig {
            decimate_above: usize::MAX,
            ..SwarmConfig::default()
        };
        let view = Size::new(1280.0, 720.0);
        let host = GlyphBlockHost::new(Some(Rect::from_size(view)));
        TransitionController::start(cfg, host, view, Duration::ZERO)
            .expect("anchor present")
            .particles()
            .len()
    };
    assert!(full > 5000);
    assert_eq!(swarm.particles().len(), full.div_ceil(2));
}
