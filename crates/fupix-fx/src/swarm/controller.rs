#![forbid(unsafe_code)]

//! Scroll-gated transition controller.
//!
//! Owns the particles, the stage, the pending timers and the gesture gate.
//! The host feeds it input, time and resizes, draws it every animation frame
//! and applies the [`HostCommand`]s it queues.
//!
//! # Invariants
//!
//! - Every stage change follows [`Stage::can_transition_to`].
//! - A gesture is intercepted iff its direction, the current section and
//!   the current stage all match one of the two transitions and no
//!   transition is in flight. The same predicate serves wheel, touch and
//!   keyboard input.
//! - A scroll lock issued on entering a locked stage is released when the
//!   controller leaves the locked run of stages.
//! - Particle targets are only replaced by a resample, never mutated.
//!
//! # Failure Modes
//!
//! - No anchor at start: [`FxError::AnchorMissing`]; the host leaves the
//!   effect off.
//! - Anchor disappears later: resampling yields no particles and the
//!   lifecycle continues with an empty swarm.

use std::time::Duration;

use bitflags::bitflags;
use fupix_core::event::{InputEvent, ScrollDirection, TouchTracker};
use fupix_core::geometry::Size;
use fupix_core::rng::Rng;
use fupix_core::theme::{Rgb, Theme, ThemePalette};
use fupix_core::timer::{Debounce, Scheduler};
use tracing::{debug, info};

use super::particle::Particle;
use super::render::{FrameStats, render_swarm};
use super::stage::{Stage, SwarmPhase};
use super::ANCHOR_ELEMENT_ID;
use crate::config::SwarmConfig;
use crate::error::FxError;
use crate::shape::{ShapeHost, sample_shape};
use crate::surface::Surface;

bitflags! {
    /// Presentation markers applied to the home section.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Markers: u8 {
        /// The effect started.
        const READY = 1 << 0;
        /// Overlay UI hidden while the logo is away.
        const UI_HIDDEN = 1 << 1;
        /// The static logo is shown.
        const LOGO_VISIBLE = 1 << 2;
        /// The scroll hint is shown.
        const SCROLL_READY = 1 << 3;
    }
}

impl Markers {
    /// `(flag, css class)` pairs in a stable order.
    pub const CLASSES: [(Markers, &'static str); 4] = [
        (Markers::READY, "ready"),
        (Markers::UI_HIDDEN, "ui-hidden"),
        (Markers::LOGO_VISIBLE, "logo-visible"),
        (Markers::SCROLL_READY, "scroll-ready"),
    ];

    /// CSS classes for the set flags.
    pub fn class_names(self) -> impl Iterator<Item = &'static str> {
        Self::CLASSES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, class)| class)
    }
}

/// Side effect for the host to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Stop user scrolling of the scroll container.
    LockScroll,
    /// Restore user scrolling (and snap).
    UnlockScroll,
    /// Smooth-scroll to the section at this index.
    ScrollToSection(usize),
    /// The home section's markers are now exactly these.
    Markers(Markers),
}

/// Whether the host should cancel the native default for an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureResponse {
    /// The controller consumed the gesture; call `preventDefault`.
    Intercept,
    /// Let the browser handle it.
    PassThrough,
}

impl GestureResponse {
    #[must_use]
    pub fn is_intercept(self) -> bool {
        self == Self::Intercept
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    LogoReveal,
    Ready,
    DisperseComplete,
    SettleComplete,
    BeginReassembly,
    ReassemblyComplete,
}

impl Timer {
    fn belongs_to_assembly(&self) -> bool {
        matches!(self, Self::LogoReveal | Self::Ready)
    }
}

/// The particle logo state machine.
#[derive(Debug)]
pub struct TransitionController<H> {
    config: SwarmConfig,
    host: H,
    rng: Rng,
    viewport: Size,
    particles: Vec<Particle>,
    stage: Stage,
    markers: Markers,
    timers: Scheduler<Timer>,
    resize: Debounce<Size>,
    deferred_resize: Option<Size>,
    touch: TouchTracker,
    accent: Rgb,
    running: bool,
    commands: Vec<HostCommand>,
}

impl<H: ShapeHost> TransitionController<H> {
    /// Start the effect at `now`: set [`Markers::READY`], sample the shape
    /// and begin assembling.
    pub fn start(
        config: SwarmConfig,
        host: H,
        viewport: Size,
        now: Duration,
    ) -> Result<Self, FxError> {
        if host.anchor().is_none() {
            return Err(FxError::AnchorMissing(ANCHOR_ELEMENT_ID));
        }
        let mut controller = Self {
            rng: Rng::new(config.seed),
            resize: Debounce::new(config.resize_debounce()),
            config,
            host,
            viewport,
            particles: Vec::new(),
            stage: Stage::Assembling,
            markers: Markers::empty(),
            timers: Scheduler::new(),
            deferred_resize: None,
            touch: TouchTracker::default(),
            accent: ThemePalette::DARK.accent,
            running: true,
            commands: Vec::new(),
        };
        controller.update_markers(Markers::READY, Markers::empty());
        controller.regenerate(now);
        info!(particles = controller.particles.len(), "particle system started");
        Ok(controller)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn phase(&self) -> SwarmPhase {
        self.stage.phase()
    }

    #[must_use]
    pub fn markers(&self) -> Markers {
        self.markers
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[must_use]
    pub fn is_scroll_locked(&self) -> bool {
        self.stage.scroll_locked()
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.stage.in_flight()
    }

    /// Current canvas size; the host sizes its canvas to match.
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    #[must_use]
    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Earliest time at which [`tick`](Self::tick) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.timers.next_deadline(), self.resize.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drain queued host commands in emission order.
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    #[must_use]
    pub fn pending_command_count(&self) -> usize {
        self.commands.len()
    }

    // -----------------------------------------------------------------------
    // Host signals
    // -----------------------------------------------------------------------

    /// Route a gesture. `section` is the current section index, `None` when
    /// the viewport is degenerate; such gestures always pass through.
    pub fn handle_input(
        &mut self,
        event: &InputEvent,
        section: Option<usize>,
        now: Duration,
    ) -> GestureResponse {
        let direction = match event {
            InputEvent::Wheel { delta_y } => ScrollDirection::from_wheel(*delta_y),
            InputEvent::TouchStart { y } => {
                self.touch.begin(*y);
                None
            }
            InputEvent::TouchMove { y } => self.touch.direction(*y),
            InputEvent::Key(key) => ScrollDirection::from_key(&key.code),
        };
        let Some(direction) = direction else {
            return GestureResponse::PassThrough;
        };
        if !self.accepts(direction, section) {
            return GestureResponse::PassThrough;
        }
        if let InputEvent::TouchMove { y } = event {
            self.touch.rebase(*y);
        }
        match direction {
            ScrollDirection::Forward => self.begin_dispersal(now),
            ScrollDirection::Backward => self.begin_return(now),
        }
        GestureResponse::Intercept
    }

    /// The gesture gate.
    #[must_use]
    pub fn accepts(&self, direction: ScrollDirection, section: Option<usize>) -> bool {
        let Some(section) = section else {
            return false;
        };
        if self.stage.in_flight() {
            return false;
        }
        match direction {
            ScrollDirection::Forward => {
                section == self.config.home_section && self.stage == Stage::Assembled
            }
            ScrollDirection::Backward => {
                section == self.config.next_section && self.stage == Stage::Dispersed
            }
        }
    }

    /// Record a viewport resize; resampling happens after the quiet period.
    pub fn resize(&mut self, viewport: Size, now: Duration) {
        self.resize.push(now, viewport);
    }

    /// Pause or resume drawing (section visibility). Timers keep running.
    pub fn set_visible(&mut self, visible: bool) {
        if self.running != visible {
            debug!(visible, "particle loop visibility changed");
        }
        self.running = visible;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.accent = ThemePalette::for_theme(theme).accent;
    }

    // -----------------------------------------------------------------------
    // Frame pipeline
    // -----------------------------------------------------------------------

    /// Fire due timers and apply a settled resize.
    pub fn tick(&mut self, now: Duration) {
        while let Some((due, timer)) = self.timers.pop_due_entry(now) {
            self.fire(timer, due);
        }
        if let Some(size) = self.resize.poll(now) {
            self.deferred_resize = Some(size);
        }
        if self.stage.accepts_resize() {
            if let Some(size) = self.deferred_resize.take() {
                debug!(width = size.width, height = size.height, "resampling after resize");
                self.viewport = size;
                self.regenerate(now);
            }
        }
    }

    /// Advance particle physics by one frame.
    pub fn step(&mut self, now: Duration) {
        let phase = self.stage.phase();
        for p in &mut self.particles {
            p.update(phase, now);
        }
    }

    /// Draw the current frame.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) -> FrameStats {
        render_swarm(
            surface,
            &self.particles,
            self.stage.phase(),
            self.accent,
            self.config.connection_distance,
            self.config.connection_lookahead,
        )
    }

    /// One animation frame: `tick`, then (if visible) `step` and `render`.
    pub fn frame<S: Surface + ?Sized>(&mut self, now: Duration, surface: &mut S) -> FrameStats {
        self.tick(now);
        if !self.running {
            return FrameStats::default();
        }
        self.step(now);
        self.render(surface)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn regenerate(&mut self, now: Duration) {
        let points = sample_shape(&self.config, &mut self.host, self.viewport);
        let stride = if points.len() > self.config.decimate_above {
            2
        } else {
            1
        };
        let delay = self.config.assemble_delay();
        self.particles = points
            .into_iter()
            .step_by(stride)
            .map(|pt| Particle::spawn(pt.to_vec2(), now, delay, &mut self.rng))
            .collect();

        self.timers.cancel_where(Timer::belongs_to_assembly);
        self.timers
            .schedule(now, self.config.logo_delay(), Timer::LogoReveal);
        self.timers.schedule(now, self.config.ready_delay(), Timer::Ready);
        self.enter(Stage::Assembling);
        self.update_markers(Markers::empty(), Markers::SCROLL_READY);
    }

    fn begin_dispersal(&mut self, now: Duration) {
        info!("triggering dispersion");
        self.enter(Stage::Dispersing);
        self.update_markers(
            Markers::UI_HIDDEN,
            Markers::SCROLL_READY | Markers::LOGO_VISIBLE,
        );
        self.commands.push(HostCommand::LockScroll);
        self.timers
            .schedule(now, self.config.disperse_duration(), Timer::DisperseComplete);
    }

    fn begin_return(&mut self, now: Duration) {
        info!("triggering reassembly");
        self.enter(Stage::Returning);
        self.commands.push(HostCommand::LockScroll);
        self.commands
            .push(HostCommand::ScrollToSection(self.config.home_section));
        self.timers.schedule(
            now,
            self.config.return_scroll_duration(),
            Timer::BeginReassembly,
        );
    }

    /// Run `timer`; follow-up timers are scheduled relative to `due`.
    fn fire(&mut self, timer: Timer, due: Duration) {
        match timer {
            Timer::LogoReveal => self.update_markers(Markers::LOGO_VISIBLE, Markers::empty()),
            Timer::Ready => {
                self.enter(Stage::Assembled);
                self.update_markers(Markers::SCROLL_READY, Markers::empty());
                info!("ready for scroll interaction");
            }
            Timer::DisperseComplete => {
                self.enter(Stage::Settling);
                self.commands.push(HostCommand::UnlockScroll);
                self.commands
                    .push(HostCommand::ScrollToSection(self.config.next_section));
                self.timers
                    .schedule(due, self.config.settle_duration(), Timer::SettleComplete);
            }
            Timer::SettleComplete => self.enter(Stage::Dispersed),
            Timer::BeginReassembly => {
                self.enter(Stage::Reassembling);
                self.update_markers(Markers::empty(), Markers::UI_HIDDEN);
                for p in &mut self.particles {
                    p.reset_for_reassembly();
                }
                self.timers.schedule(
                    due,
                    self.config.reassemble_duration(),
                    Timer::ReassemblyComplete,
                );
            }
            Timer::ReassemblyComplete => {
                self.enter(Stage::Assembled);
                self.update_markers(Markers::LOGO_VISIBLE | Markers::SCROLL_READY, Markers::empty());
                self.commands.push(HostCommand::UnlockScroll);
                info!("reassembly complete");
            }
        }
    }

    fn enter(&mut self, next: Stage) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "illegal stage change {} -> {next}",
            self.stage
        );
        debug!(from = %self.stage, to = %next, "stage change");
        self.stage = next;
    }

    fn update_markers(&mut self, insert: Markers, remove: Markers) {
        let next = (self.markers | insert) - remove;
        if next != self.markers {
            self.markers = next;
            self.commands.push(HostCommand::Markers(next));
        }
    }
}

#[cfg(test)]
mod tests {
    use fupix_core::event::{KeyCode, KeyEvent};
    use fupix_core::geometry::Rect;

    use super::*;
    use crate::shape::GlyphBlockHost;
    use crate::surface::RecordingSurface;

    const VIEW: Size = Size::new(800.0, 600.0);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn controller() -> TransitionController<GlyphBlockHost> {
        let host = GlyphBlockHost::new(Some(Rect::from_size(VIEW)));
        TransitionController::start(SwarmConfig::default(), host, VIEW, Duration::ZERO).unwrap()
    }

    fn assembled() -> TransitionController<GlyphBlockHost> {
        let mut c = controller();
        c.tick(ms(3500));
        c.drain_commands();
        c
    }

    fn wheel(delta_y: f32) -> InputEvent {
        InputEvent::Wheel { delta_y }
    }

    #[test]
    fn start_requires_anchor() {
        let err = TransitionController::start(
            SwarmConfig::default(),
            GlyphBlockHost::new(None),
            VIEW,
            Duration::ZERO,
        )
        .unwrap_err();
        assert_eq!(err, FxError::AnchorMissing("textTarget"));
    }

    #[test]
    fn start_marks_ready_and_assembles() {
        let mut c = controller();
        assert_eq!(c.stage(), Stage::Assembling);
        assert!(!c.particles().is_empty());
        assert_eq!(
            c.drain_commands(),
            vec![HostCommand::Markers(Markers::READY)]
        );
        assert_eq!(c.next_deadline(), Some(ms(2000)));
    }

    #[test]
    fn logo_then_ready() {
        let mut c = controller();
        c.drain_commands();
        c.tick(ms(1999));
        assert!(c.drain_commands().is_empty());
        c.tick(ms(2000));
        assert_eq!(c.markers(), Markers::READY | Markers::LOGO_VISIBLE);
        c.tick(ms(3499));
        assert_eq!(c.stage(), Stage::Assembling);
        c.tick(ms(3500));
        assert_eq!(c.stage(), Stage::Assembled);
        assert!(c.markers().contains(Markers::SCROLL_READY));
    }

    #[test]
    fn gestures_ignored_while_assembling() {
        let mut c = controller();
        assert_eq!(
            c.handle_input(&wheel(100.0), Some(0), ms(10)),
            GestureResponse::PassThrough
        );
        assert_eq!(c.stage(), Stage::Assembling);
    }

    #[test]
    fn backward_gesture_on_home_passes_through() {
        let mut c = assembled();
        let key = InputEvent::Key(KeyEvent::new(KeyCode::Up));
        assert!(!c.handle_input(&key, Some(0), ms(4000)).is_intercept());
        assert_eq!(c.stage(), Stage::Assembled);
    }

    #[test]
    fn degenerate_viewport_never_intercepts() {
        use fupix_core::section::section_index;

        let mut c = assembled();
        let section = section_index(5000.0, 0.0);
        assert_eq!(section, None);
        let key = InputEvent::Key(KeyEvent::new(KeyCode::Down));
        for event in [wheel(100.0), key] {
            assert_eq!(c.handle_input(&event, section, ms(4000)), GestureResponse::PassThrough);
        }
        assert_eq!(c.stage(), Stage::Assembled);
        assert!(c.drain_commands().is_empty());
        assert!(!c.accepts(ScrollDirection::Forward, None));
    }

    #[test]
    fn touch_rebases_after_intercept() {
        let mut c = assembled();
        assert!(!c.handle_input(&InputEvent::TouchStart { y: 500.0 }, Some(0), ms(4000)).is_intercept());
        assert!(!c.handle_input(&InputEvent::TouchMove { y: 480.0 }, Some(0), ms(4001)).is_intercept());
        assert!(c.handle_input(&InputEvent::TouchMove { y: 460.0 }, Some(0), ms(4002)).is_intercept());
        assert_eq!(c.stage(), Stage::Dispersing);
    }

    #[test]
    fn render_scattered_draws_no_lines() {
        let mut c = assembled();
        c.handle_input(&wheel(1.0), Some(0), ms(4000));
        let mut surface = RecordingSurface::new(VIEW);
        let stats = c.frame(ms(4016), &mut surface);
        assert_eq!(stats.lines_drawn, 0);
        assert_eq!(stats.particles_drawn, c.particles().len());
    }

    #[test]
    fn hidden_controller_still_fires_timers() {
        let mut c = controller();
        c.set_visible(false);
        let mut surface = RecordingSurface::new(VIEW);
        let stats = c.frame(ms(3500), &mut surface);
        assert_eq!(stats, FrameStats::default());
        assert!(surface.ops().is_empty());
        assert_eq!(c.stage(), Stage::Assembled);
    }

    #[test]
    fn resize_is_debounced_and_resamples() {
        let mut c = assembled();
        c.resize(Size::new(640.0, 480.0), ms(4000));
        c.resize(Size::new(700.0, 500.0), ms(4100));
        c.tick(ms(4399));
        assert_eq!(c.stage(), Stage::Assembled);
        assert_eq!(c.next_deadline(), Some(ms(4400)));
        c.tick(ms(4400));
        assert_eq!(c.stage(), Stage::Assembling);
        assert_eq!(c.viewport(), Size::new(700.0, 500.0));
        assert_eq!(c.host().rasterize_count(), 2);
        assert!(!c.markers().contains(Markers::SCROLL_READY));
        c.tick(ms(7900));
        assert_eq!(c.stage(), Stage::Assembled);
    }

    #[test]
    fn resize_during_transition_is_deferred() {
        let mut c = assembled();
        c.handle_input(&wheel(1.0), Some(0), ms(4000));
        c.resize(Size::new(640.0, 480.0), ms(4100));
        c.tick(ms(4400));
        assert_eq!(c.stage(), Stage::Dispersing);
        assert_eq!(c.viewport(), VIEW);
        c.tick(ms(5500));
        c.tick(ms(6000));
        assert_eq!(c.stage(), Stage::Dispersed);
        c.handle_input(&wheel(-1.0), Some(1), ms(7000));
        c.tick(ms(7300));
        c.tick(ms(9100));
        // Back in `Assembled`, the pending size is applied on the same tick.
        assert_eq!(c.stage(), Stage::Assembling);
        assert_eq!(c.viewport(), Size::new(640.0, 480.0));
    }

    #[test]
    fn markers_map_to_classes() {
        let m = Markers::READY | Markers::SCROLL_READY;
        assert_eq!(m.class_names().collect::<Vec<_>>(), vec!["ready", "scroll-ready"]);
    }
}
