#![forbid(unsafe_code)]

//! Swarm lifecycle stages.
//!
//! [`SwarmPhase`] is what the particles see; [`Stage`] refines it with the
//! in-flight sub-states the gesture gate and the scroll lock depend on.
//!
//! ```text
//!   Assembling ──ready──► Assembled ──forward──► Dispersing ──1500ms──► Settling
//!       ▲  ▲                 ▲   │                                         │
//!       └──┴──── resize ─────┘───┘                                      500ms
//!                            │                                             ▼
//!                      Reassembling ◄──300ms── Returning ◄──backward── Dispersed
//!                            └──1800ms──► Assembled
//! ```

use std::fmt;

/// The particle motion regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwarmPhase {
    Assembling,
    Assembled,
    Dispersing,
    Dispersed,
    Reassembling,
}

impl SwarmPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assembling => "assembling",
            Self::Assembled => "assembled",
            Self::Dispersing => "dispersing",
            Self::Dispersed => "dispersed",
            Self::Reassembling => "reassembling",
        }
    }

    /// Particles fly outward and are drawn without connections.
    #[must_use]
    pub const fn is_scattered(self) -> bool {
        matches!(self, Self::Dispersing | Self::Dispersed)
    }
}

impl fmt::Display for SwarmPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controller stage. Exactly one is live at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Particles are flying in; gestures are ignored.
    Assembling,
    /// Logo formed and idle; a forward gesture on the home panel disperses.
    Assembled,
    /// Particles fly out while page scrolling is locked.
    Dispersing,
    /// Smooth scroll to the next panel is running.
    Settling,
    /// Logo gone; a backward gesture on the next panel brings it back.
    Dispersed,
    /// Smooth scroll home has started; reassembly begins shortly.
    Returning,
    /// Particles spring back to their targets.
    Reassembling,
}

impl Stage {
    #[must_use]
    pub const fn phase(self) -> SwarmPhase {
        match self {
            Self::Assembling => SwarmPhase::Assembling,
            Self::Assembled => SwarmPhase::Assembled,
            Self::Dispersing => SwarmPhase::Dispersing,
            Self::Settling | Self::Dispersed | Self::Returning => SwarmPhase::Dispersed,
            Self::Reassembling => SwarmPhase::Reassembling,
        }
    }

    /// A timed transition is running; gestures pass through untouched.
    #[must_use]
    pub const fn in_flight(self) -> bool {
        matches!(
            self,
            Self::Dispersing | Self::Settling | Self::Returning | Self::Reassembling
        )
    }

    /// Page scrolling is disabled while in this stage.
    #[must_use]
    pub const fn scroll_locked(self) -> bool {
        matches!(self, Self::Dispersing | Self::Returning | Self::Reassembling)
    }

    /// Resize may resample the shape.
    #[must_use]
    pub const fn accepts_resize(self) -> bool {
        matches!(self, Self::Assembling | Self::Assembled)
    }

    /// The legal edges of the lifecycle. `Assembling`/`Assembled` →
    /// `Assembling` is the resample edge.
    #[must_use]
    pub const fn can_transition_to(self, next: Stage) -> bool {
        matches!(
            (self, next),
            (Self::Assembling, Self::Assembled)
                | (Self::Assembling, Self::Assembling)
                | (Self::Assembled, Self::Assembling)
                | (Self::Assembled, Self::Dispersing)
                | (Self::Dispersing, Self::Settling)
                | (Self::Settling, Self::Dispersed)
                | (Self::Dispersed, Self::Returning)
                | (Self::Returning, Self::Reassembling)
                | (Self::Reassembling, Self::Assembled)
        )
    }

    pub const ALL: [Stage; 7] = [
        Self::Assembling,
        Self::Assembled,
        Self::Dispersing,
        Self::Settling,
        Self::Dispersed,
        Self::Returning,
        Self::Reassembling,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
