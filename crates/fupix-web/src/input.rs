#![forbid(unsafe_code)]

//! JSON-friendly DOM input schema.
//!
//! The browser glue reduces wheel, touch and keyboard events to a
//! [`DomInput`] and this module normalizes it into the canonical
//! [`InputEvent`] the controllers consume. Keeping the mapping here lets it
//! be tested natively and replayed from recorded traces.

use fupix_core::event::{InputEvent, KeyCode, KeyEvent, Modifiers};
use serde::{Deserialize, Serialize};

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One DOM event as seen by the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomInput {
    /// `WheelEvent.deltaY`.
    Wheel { dy: f32 },
    /// First touch point's `clientY`; absent on end/cancel.
    Touch {
        phase: TouchPhase,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<f32>,
    },
    /// `KeyboardEvent.key` plus a modifier bitset.
    Key {
        key: String,
        #[serde(default)]
        mods: u8,
    },
}

impl DomInput {
    /// Normalize into a controller event. Touch end/cancel and touch events
    /// without a point carry no gesture and map to `None`.
    #[must_use]
    pub fn to_input_event(&self) -> Option<InputEvent> {
        match self {
            Self::Wheel { dy } if dy.is_finite() => Some(InputEvent::Wheel { delta_y: *dy }),
            Self::Wheel { .. } => None,
            Self::Touch { phase, y } => {
                let y = y.filter(|y| y.is_finite())?;
                match phase {
                    TouchPhase::Start => Some(InputEvent::TouchStart { y }),
                    TouchPhase::Move => Some(InputEvent::TouchMove { y }),
                    TouchPhase::End | TouchPhase::Cancel => None,
                }
            }
            Self::Key { key, mods } => Some(InputEvent::Key(key_event(key, *mods))),
        }
    }

    /// Encode as a stable JSON string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a JSON event.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Pack DOM modifier flags into the `mods` bitset.
#[must_use]
pub fn modifier_bits(shift: bool, alt: bool, ctrl: bool, meta: bool) -> u8 {
    let mut mods = Modifiers::empty();
    mods.set(Modifiers::SHIFT, shift);
    mods.set(Modifiers::ALT, alt);
    mods.set(Modifiers::CTRL, ctrl);
    mods.set(Modifiers::SUPER, meta);
    mods.bits()
}

/// Build a key event from a DOM `key` and modifier bitset. Unknown bits are
/// dropped.
#[must_use]
pub fn key_event(key: &str, mods: u8) -> KeyEvent {
    KeyEvent::new(KeyCode::from_dom_key(key)).with_modifiers(Modifiers::from_bits_truncate(mods))
}
