//! Property-based invariants for particles and the gesture gate.
//!
//! Verifies:
//! 1. A particle's target never changes, whatever phases it is driven through.
//! 2. Dispersal speed is non-increasing while scattered and only
//!    `reset_for_reassembly` restores it.
//! 3. For wheel, touch and keyboard alike, a gesture whose section does not
//!    match the transition source is a no-op.
//! 4. Random gesture streams only ever produce legal stage changes.

use std::time::Duration;

use fupix_core::event::{InputEvent, KeyCode, KeyEvent};
use fupix_core::geometry::{Rect, Size, Vec2};
use fupix_core::rng::Rng;
use fupix_fx::shape::GlyphBlockHost;
use fupix_fx::swarm::{GestureResponse, Particle, Stage, SwarmPhase, TransitionController};
use fupix_fx::SwarmConfig;
use proptest::prelude::*;

const VIEW: Size = Size::new(400.0, 300.0);

fn phase_strategy() -> impl Strategy<Value = SwarmPhase> {
    prop_oneof![
        Just(SwarmPhase::Assembling),
        Just(SwarmPhase::Assembled),
        Just(SwarmPhase::Dispersing),
        Just(SwarmPhase::Dispersed),
        Just(SwarmPhase::Reassembling),
    ]
}

fn gesture_strategy() -> impl Strategy<Value = Vec<InputEvent>> {
    prop_oneof![
        (-500.0f32..500.0).prop_map(|delta_y| vec![InputEvent::Wheel { delta_y }]),
        (0.0f32..800.0, -300.0f32..300.0).prop_map(|(y, d)| vec![
            InputEvent::TouchStart { y },
            InputEvent::TouchMove { y: y + d },
        ]),
        prop_oneof![
            Just(KeyCode::Up),
            Just(KeyCode::Down),
            Just(KeyCode::PageUp),
            Just(KeyCode::PageDown),
            Just(KeyCode::Char(' ')),
            Just(KeyCode::Enter),
        ]
        .prop_map(|code| vec![InputEvent::Key(KeyEvent::new(code))]),
    ]
}

fn controller_at(stage: Stage) -> TransitionController<GlyphBlockHost> {
    let host = GlyphBlockHost::new(Some(Rect::from_size(VIEW)));
    let mut c = TransitionController::start(SwarmConfig::default(), host, VIEW, Duration::ZERO)
        .expect("anchor present");
    c.tick(Duration::from_millis(3500));
    if stage == Stage::Dispersed {
        c.handle_input(&InputEvent::Wheel { delta_y: 1.0 }, Some(0), Duration::from_millis(3500));
        c.tick(Duration::from_millis(5500));
    }
    assert_eq!(c.stage(), stage);
    c.drain_commands();
    c
}

proptest! {
    #[test]
    fn target_is_invariant(
        seed in any::<u64>(),
        tx in 0.0f32..2000.0,
        ty in 0.0f32..1200.0,
        phases in prop::collection::vec((phase_strategy(), 0u64..10_000), 1..60),
        resets in prop::collection::vec(any::<bool>(), 60),
    ) {
        let target = Vec2::new(tx, ty);
        let mut p = Particle::spawn(target, Duration::ZERO, Duration::from_millis(1500), &mut Rng::new(seed));
        for (i, (phase, t)) in phases.into_iter().enumerate() {
            p.update(phase, Duration::from_millis(t));
            if resets[i] {
                p.reset_for_reassembly();
            }
            prop_assert_eq!(p.target(), target);
        }
    }

    #[test]
    fn disperse_speed_never_increases(seed in any::<u64>(), frames in 1usize..300) {
        let mut p = Particle::spawn(Vec2::ZERO, Duration::ZERO, Duration::ZERO, &mut Rng::new(seed));
        let base = p.disperse_speed();
        let mut last = base;
        for i in 0..frames {
            let phase = if i % 2 == 0 { SwarmPhase::Dispersing } else { SwarmPhase::Dispersed };
            p.update(phase, Duration::ZERO);
            prop_assert!(p.disperse_speed() <= last);
            last = p.disperse_speed();
        }
        p.update(SwarmPhase::Reassembling, Duration::ZERO);
        prop_assert_eq!(p.disperse_speed(), last);
        p.reset_for_reassembly();
        prop_assert_eq!(p.disperse_speed(), base);
    }

    #[test]
    fn off_section_gestures_are_no_ops(
        gesture in gesture_strategy(),
        section in 0usize..6,
        dispersed in any::<bool>(),
    ) {
        let stage = if dispersed { Stage::Dispersed } else { Stage::Assembled };
        let source = if dispersed { 1 } else { 0 };
        prop_assume!(section != source);
        let mut c = controller_at(stage);
        for event in &gesture {
            let r = c.handle_input(event, Some(section), Duration::from_millis(6000));
            prop_assert_eq!(r, GestureResponse::PassThrough);
        }
        prop_assert_eq!(c.stage(), stage);
        prop_assert!(c.drain_commands().is_empty());
    }

    #[test]
    fn gesture_streams_follow_the_cycle(
        steps in prop::collection::vec((gesture_strategy(), 0usize..3, 0u64..2500), 1..25),
    ) {
        let mut c = controller_at(Stage::Assembled);
        let mut now = Duration::from_millis(3500);
        for (gesture, section, wait) in steps {
            for event in &gesture {
                let before = c.stage();
                let intercepted = c.handle_input(event, Some(section), now).is_intercept();
                let after = c.stage();
                if intercepted {
                    prop_assert!(before.can_transition_to(after), "{before} -> {after}");
                    prop_assert!(before == Stage::Assembled || before == Stage::Dispersed);
                } else {
                    prop_assert_eq!(before, after);
                }
            }
            let before = c.stage();
            now += Duration::from_millis(wait);
            c.tick(now);
            let after = c.stage();
            prop_assert!(before == after || reachable(before, after), "{before} -> {after}");
        }
    }
}

/// Whether `to` can be reached from `from` by timers alone.
fn reachable(from: Stage, to: Stage) -> bool {
    let mut s = from;
    for _ in 0..Stage::ALL.len() {
        let next = match s {
            Stage::Dispersing => Stage::Settling,
            Stage::Settling => Stage::Dispersed,
            Stage::Returning => Stage::Reassembling,
            Stage::Reassembling => Stage::Assembled,
            _ => return false,
        };
        if next == to {
            return true;
        }
        s = next;
    }
    false
}
