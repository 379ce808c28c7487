//! Gesture classifiers: both from LeapMotion hardware and keyboard simulation.
//!
//! Both implement [`GestureClassifier`] and run on the classifier worker
//! thread; the frame loop never knows which one is live.

use std::sync::mpsc::{Receiver, TryRecvError};

use tinsel_mode::GestureLabel;

use crate::classifier::GestureClassifier;
use crate::error::ClassifierError;

// ════════════════════════════════════════════════════════════════════════════
// KeyboardClassifier: keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    /// The hand pose currently held on the keyboard (`None` = no keys).
    Hand(Option<GestureLabel>),
}

/// Hand pose for the simulation keys currently held.
///
/// Several keys at once resolve as Pinch, then OpenPalm, then ClosedFist,
/// then Other.
pub fn pose_from_keys(palm: bool, fist: bool, pinch: bool, other: bool) -> Option<GestureLabel> {
    if pinch {
        Some(GestureLabel::Pinch)
    } else if palm {
        Some(GestureLabel::OpenPalm)
    } else if fist {
        Some(GestureLabel::ClosedFist)
    } else if other {
        Some(GestureLabel::Other)
    } else {
        None
    }
}

/// Classifier driven by [`SimInput`] events from the visualizer's window.
///
/// The window sends the held pose every frame; each classify reports the
/// latest pose seen.  This decouples the window event loop from the
/// classifier worker.
pub struct KeyboardClassifier {
    rx:   Receiver<SimInput>,
    pose: Option<GestureLabel>,
}

impl KeyboardClassifier {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        KeyboardClassifier { rx, pose: None }
    }
}

impl GestureClassifier for KeyboardClassifier {
    fn classify(&mut self) -> Result<Option<GestureLabel>, ClassifierError> {
        loop {
            match self.rx.try_recv() {
                Ok(SimInput::Hand(pose)) => self.pose = pose,
                Err(TryRecvError::Empty) => return Ok(self.pose),
                Err(TryRecvError::Disconnected) => {
                    self.pose = None;
                    return Err(ClassifierError::Sensing("simulation window closed".into()));
                }
            }
        }
    }

    fn name(&self) -> &str {
        "keyboard"
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapClassifier: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Classifier backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// # Algorithm
///
/// Only the first tracked hand counts.
///
/// * **Pinch**: thumb tip within `PINCH_DIST` of the index tip.
/// * **OpenPalm**: all four fingers extended.
/// * **ClosedFist**: no finger extended.
/// * anything else is **Other**.
#[cfg(feature = "leap")]
pub struct LeapClassifier {
    connection: leaprs::Connection,
}

#[cfg(feature = "leap")]
impl LeapClassifier {
    pub fn open() -> Result<Self, ClassifierError> {
        use leaprs::*;

        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| ClassifierError::Init(format!("LeapC connection: {e:?}")))?;
        connection
            .open()
            .map_err(|e| ClassifierError::Init(format!("LeapMotion device: {e:?}")))?;
        Ok(LeapClassifier { connection })
    }
}

#[cfg(feature = "leap")]
impl GestureClassifier for LeapClassifier {
    fn classify(&mut self) -> Result<Option<GestureLabel>, ClassifierError> {
        use leaprs::*;

        let msg = self
            .connection
            .poll(25)
            .map_err(|e| ClassifierError::Sensing(format!("{e:?}")))?;

        match msg.event() {
            Event::Tracking(frame) => Ok(frame.hands().next().map(|hand| classify_hand(&hand))),
            _ => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "leapmotion"
    }
}

#[cfg(feature = "leap")]
fn classify_hand(hand: &leaprs::Hand) -> GestureLabel {
    const PINCH_DIST:   f32 = 30.0; // mm between thumb and index tips
    const EXTENDED:     f32 = 0.7;
    const CURLED:       f32 = 0.45;

    let fingers: Vec<_> = hand.digits().collect();
    if fingers.len() < 5 {
        return GestureLabel::Other;
    }

    let thumb = fingers[0].distal().next_joint();
    let index = fingers[1].distal().next_joint();
    let (dx, dy, dz) = (thumb.x - index.x, thumb.y - index.y, thumb.z - index.z);
    let pinch = (dx * dx + dy * dy + dz * dz).sqrt();

    let extension: Vec<f32> = fingers[1..].iter().map(finger_extension).collect();
    classify_pose(pinch < PINCH_DIST, &extension, EXTENDED, CURLED)
}

#[cfg(feature = "leap")]
fn finger_extension(digit: &leaprs::Digit) -> f32 {
    // Ratio of (tip – metacarpal base) distance to full finger length.
    // 1.0 = fully extended, ~0.0 = fully curled.
    let base = digit.metacarpal().prev_joint();
    let tip  = digit.distal().next_joint();
    let dx   = tip.x - base.x;
    let dy   = tip.y - base.y;
    let dz   = tip.z - base.z;
    let dist = (dx*dx + dy*dy + dz*dz).sqrt();
    // Normalise to ~0–1 using typical finger length ≈ 80 mm
    (dist / 80.0).clamp(0.0, 1.0)
}

/// Map pinch proximity and per-finger extension (index → pinky) to a label.
pub fn classify_pose(pinching: bool, extension: &[f32], extended: f32, curled: f32) -> GestureLabel {
    if pinching {
        GestureLabel::Pinch
    } else if !extension.is_empty() && extension.iter().all(|&e| e > extended) {
        GestureLabel::OpenPalm
    } else if !extension.is_empty() && extension.iter().all(|&e| e < curled) {
        GestureLabel::ClosedFist
    } else {
        GestureLabel::Other
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
