//! # tinsel_mode
//!
//! Turns a noisy stream of per-frame hand-gesture labels into stable scene
//! state, and schedules the photo fan that opens on a pinch.
//!
//! ## Gesture → Action mapping
//!
//! | Label | Action |
//! |---|---|
//! | `OpenPalm` | Scatter into snow; also ends any pinch (closing the gallery) |
//! | `ClosedFist` | Assemble the tree |
//! | `Pinch` | Open the photo gallery; held open for 500 ms after the last pinch |
//! | `Other` | Status text only |
//! | *(no hand)* | Close the gallery once the pinch grace has run out |
//!
//! Mode changes are debounced (300 ms after the previous mode change), and
//! every structural change (mode or gallery) starts a global 2 s cooldown
//! during which further structural changes are discarded outright.
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Duration;
//! use tinsel_mode::{GestureLabel, GestureModeMachine, Mode};
//!
//! let mut machine = GestureModeMachine::default();
//! machine.tick(Some(GestureLabel::OpenPalm), Duration::ZERO);
//! assert_eq!(machine.state().mode(), Mode::Snow);
//!
//! // Inside the cooldown: the fist is seen but not acted on.
//! machine.tick(Some(GestureLabel::ClosedFist), Duration::from_millis(500));
//! assert_eq!(machine.state().mode(), Mode::Snow);
//!
//! machine.tick(Some(GestureLabel::ClosedFist), Duration::from_millis(2100));
//! assert_eq!(machine.state().mode(), Mode::Tree);
//! ```

pub mod gallery;
pub mod machine;

pub use gallery::{fan_placement, GalleryFan, GalleryItem, GalleryTimings};
pub use machine::{GestureModeMachine, ModeState, Transition};
pub use tinsel_field::Mode;

use std::fmt;
use std::time::Duration;

// ════════════════════════════════════════════════════════════════════════════
// GestureLabel
// ════════════════════════════════════════════════════════════════════════════

/// A discrete label reported by the external gesture classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureLabel {
    OpenPalm,
    ClosedFist,
    Pinch,
    /// Any hand pose the classifier recognised that carries no action.
    Other,
}

impl GestureLabel {
    /// Status text shown to the user.
    pub fn as_str(self) -> &'static str {
        match self {
            GestureLabel::OpenPalm   => "Open_Palm",
            GestureLabel::ClosedFist => "Closed_Fist",
            GestureLabel::Pinch      => "Pinch",
            GestureLabel::Other      => "Other",
        }
    }

    /// Map a classifier category name onto a label.
    ///
    /// Unknown non-empty names become [`GestureLabel::Other`]; `"None"` and
    /// the empty string mean no hand.
    pub fn from_category(name: &str) -> Option<GestureLabel> {
        match name {
            "Open_Palm"   => Some(GestureLabel::OpenPalm),
            "Closed_Fist" => Some(GestureLabel::ClosedFist),
            "Pinch"       => Some(GestureLabel::Pinch),
            "" | "None"   => None,
            _             => Some(GestureLabel::Other),
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ModeTimings
// ════════════════════════════════════════════════════════════════════════════

/// Timing windows of the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeTimings {
    /// Minimum gap after a committed mode change before another is considered.
    pub debounce:    Duration,
    /// How long a pinch stays latched after the last `Pinch` label.
    pub pinch_grace: Duration,
    /// Lockout after any committed structural change.
    pub cooldown:    Duration,
}

impl Default for ModeTimings {
    fn default() -> Self {
        ModeTimings {
            debounce:    Duration::from_millis(300),
            pinch_grace: Duration::from_millis(500),
            cooldown:    Duration::from_millis(2000),
        }
    }
}
