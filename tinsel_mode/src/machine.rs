//! The gesture → mode/gallery state machine.
//!
//! `GestureModeMachine::tick` is called once per animation frame with
//! whatever the classifier produced for that frame (or `None`).  It never
//! fails: every label, including no label, maps to a well-defined outcome.

use std::time::Duration;

use tinsel_field::Mode;

use crate::{GestureLabel, ModeTimings};

// ════════════════════════════════════════════════════════════════════════════
// ModeState
// ════════════════════════════════════════════════════════════════════════════

/// Scene state driven by gestures.
///
/// Timestamps are offsets from the start of the session.  `None` means the
/// event has not happened yet, which keeps the debounce and pinch windows
/// closed at start-up regardless of where the clock begins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModeState {
    mode:             Mode,
    gallery_open:     bool,
    gesture_status:   Option<GestureLabel>,
    last_mode_change: Option<Duration>,
    last_pinch:       Option<Duration>,
    cooldown_until:   Duration,
}

impl ModeState {
    pub fn mode(&self)                       -> Mode                 { self.mode }
    pub fn is_gallery_open(&self)            -> bool                 { self.gallery_open }
    pub fn gesture_status(&self)             -> Option<GestureLabel> { self.gesture_status }
    pub fn last_mode_change(&self)           -> Option<Duration>     { self.last_mode_change }
    pub fn last_pinch(&self)                 -> Option<Duration>     { self.last_pinch }
    pub fn cooldown_until(&self)             -> Duration             { self.cooldown_until }

    /// Status line text; empty when no gesture is shown.
    pub fn status_text(&self) -> &'static str {
        self.gesture_status.map_or("", GestureLabel::as_str)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Transition: what a tick did
// ════════════════════════════════════════════════════════════════════════════

/// Outcome of one [`GestureModeMachine::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed.
    Unchanged,
    /// Only the status text changed.
    StatusOnly,
    /// No hand, but the pinch grace is still running; state held.
    HoldingPinch,
    /// A structural change was wanted but the cooldown discarded it.
    Suppressed { mode: Mode, gallery_open: bool },
    /// A structural change was applied and the cooldown restarted.
    Committed { mode_changed: bool, gallery_changed: bool },
}

impl Transition {
    pub fn is_committed(&self) -> bool {
        matches!(self, Transition::Committed { .. })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureModeMachine
// ════════════════════════════════════════════════════════════════════════════

/// Owns the [`ModeState`] and is its only writer.
#[derive(Clone, Debug, Default)]
pub struct GestureModeMachine {
    state:   ModeState,
    timings: ModeTimings,
}

impl GestureModeMachine {
    pub fn new(timings: ModeTimings) -> Self {
        GestureModeMachine { state: ModeState::default(), timings }
    }

    pub fn state(&self) -> &ModeState {
        &self.state
    }

    pub fn timings(&self) -> &ModeTimings {
        &self.timings
    }

    /// True within `pinch_grace` of the most recent `Pinch` label.
    pub fn is_pinching(&self, now: Duration) -> bool {
        self.state
            .last_pinch
            .is_some_and(|t| now.saturating_sub(t) < self.timings.pinch_grace)
    }

    fn debounce_elapsed(&self, now: Duration) -> bool {
        self.state
            .last_mode_change
            .map_or(true, |t| now.saturating_sub(t) > self.timings.debounce)
    }

    // ── per-frame tick ───────────────────────────────────────────────────

    /// Feed one frame's classifier output.
    pub fn tick(&mut self, label: Option<GestureLabel>, now: Duration) -> Transition {
        if label == Some(GestureLabel::Pinch) {
            self.state.last_pinch = Some(now);
        }
        match label {
            Some(label) => self.tick_labelled(label, now),
            None        => self.tick_unlabelled(now),
        }
    }

    fn tick_labelled(&mut self, label: GestureLabel, now: Duration) -> Transition {
        let mut candidate_mode = self.state.mode;
        if self.debounce_elapsed(now) {
            match label {
                GestureLabel::OpenPalm => {
                    candidate_mode = Mode::Snow;
                    self.state.last_pinch = None;
                }
                GestureLabel::ClosedFist => candidate_mode = Mode::Tree,
                GestureLabel::Pinch | GestureLabel::Other => {}
            }
        }

        let pinching = self.is_pinching(now);
        let status = if pinching { GestureLabel::Pinch } else { label };

        if candidate_mode != self.state.mode || pinching != self.state.gallery_open {
            self.commit(candidate_mode, pinching, Some(status), now)
        } else if self.state.gesture_status != Some(status) {
            self.state.gesture_status = Some(status);
            Transition::StatusOnly
        } else {
            Transition::Unchanged
        }
    }

    fn tick_unlabelled(&mut self, now: Duration) -> Transition {
        if self.is_pinching(now) {
            return Transition::HoldingPinch;
        }
        if self.state.gallery_open {
            return self.commit(self.state.mode, false, None, now);
        }
        if self.state.gesture_status.take().is_some() {
            Transition::StatusOnly
        } else {
            Transition::Unchanged
        }
    }

    /// Apply a structural change unless the cooldown is running.
    fn commit(
        &mut self,
        mode: Mode,
        gallery_open: bool,
        status: Option<GestureLabel>,
        now: Duration,
    ) -> Transition {
        if now < self.state.cooldown_until {
            log::debug!(
                "cooldown discards {:?}/gallery={} at {:?} (until {:?})",
                mode, gallery_open, now, self.state.cooldown_until
            );
            return Transition::Suppressed { mode, gallery_open };
        }

        let mode_changed = mode != self.state.mode;
        let gallery_changed = gallery_open != self.state.gallery_open;

        self.state.mode = mode;
        self.state.gallery_open = gallery_open;
        self.state.gesture_status = status;
        self.state.cooldown_until = now + self.timings.cooldown;
        if mode_changed {
            self.state.last_mode_change = Some(now);
        }

        log::info!(
            "gesture commit at {:?}: mode={} gallery={} status={:?}",
            now,
            mode.name(),
            if gallery_open { "open" } else { "closed" },
            self.state.status_text()
        );
        Transition::Committed { mode_changed, gallery_changed }
    }

    // ── direct user controls ─────────────────────────────────────────────

    /// Set the mode from the control panel, bypassing gestures.
    ///
    /// Not gated by the cooldown and does not touch any gesture timer.
    pub fn override_mode(&mut self, mode: Mode) -> bool {
        let changed = self.state.mode != mode;
        if changed {
            log::info!("mode set directly to {}", mode.name());
        }
        self.state.mode = mode;
        changed
    }

    /// Close the gallery from the control panel (e.g. all photos removed).
    pub fn close_gallery(&mut self) -> bool {
        std::mem::replace(&mut self.state.gallery_open, false)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use GestureLabel::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn machine() -> GestureModeMachine {
        GestureModeMachine::default()
    }

    // ── start-up ─────────────────────────────────────────────────────────
    #[test]
    fn starts_as_closed_tree() {
        let m = machine();
        assert_eq!(m.state().mode(), Mode::Tree);
        assert!(!m.state().is_gallery_open());
        assert_eq!(m.state().status_text(), "");
        assert!(!m.is_pinching(Duration::ZERO));
    }

    #[test]
    fn no_hand_at_start_is_a_no_op() {
        let mut m = machine();
        assert_eq!(m.tick(None, Duration::ZERO), Transition::Unchanged);
        assert_eq!(m.state(), &ModeState::default());
    }

    // ── open palm / closed fist scenario ─────────────────────────────────
    #[test]
    fn palm_then_fist_waits_out_cooldown() {
        let mut m = machine();

        let t = m.tick(Some(OpenPalm), ms(0));
        assert_eq!(t, Transition::Committed { mode_changed: true, gallery_changed: false });
        assert_eq!(m.state().mode(), Mode::Snow);
        assert_eq!(m.state().cooldown_until(), ms(2000));
        assert_eq!(m.state().last_mode_change(), Some(ms(0)));
        assert_eq!(m.state().status_text(), "Open_Palm");

        // Repeating the palm is a no-op and leaves the cooldown alone.
        assert_eq!(m.tick(Some(OpenPalm), ms(100)), Transition::Unchanged);
        assert_eq!(m.state().cooldown_until(), ms(2000));

        let t = m.tick(Some(ClosedFist), ms(500));
        assert_eq!(t, Transition::Suppressed { mode: Mode::Tree, gallery_open: false });
        assert_eq!(m.state().mode(), Mode::Snow);
        assert_eq!(m.state().status_text(), "Open_Palm");

        assert!(matches!(m.tick(Some(ClosedFist), ms(1999)), Transition::Suppressed { .. }));

        let t = m.tick(Some(ClosedFist), ms(2100));
        assert!(t.is_committed());
        assert_eq!(m.state().mode(), Mode::Tree);
        assert_eq!(m.state().cooldown_until(), ms(4100));
        assert_eq!(m.state().last_mode_change(), Some(ms(2100)));
    }

    #[test]
    fn cooldown_ends_exactly_at_deadline() {
        let mut m = machine();
        m.tick(Some(OpenPalm), ms(0));
        assert!(m.tick(Some(ClosedFist), ms(2000)).is_committed());
    }

    #[test]
    fn debounce_blocks_mode_candidates() {
        // Short cooldown so only the debounce is in play.
        let mut m = GestureModeMachine::new(ModeTimings { cooldown: ms(0), ..ModeTimings::default() });
        m.tick(Some(OpenPalm), ms(0));
        assert_eq!(m.tick(Some(ClosedFist), ms(300)), Transition::StatusOnly);
        assert_eq!(m.state().mode(), Mode::Snow);
        assert_eq!(m.state().status_text(), "Closed_Fist");
        assert!(m.tick(Some(ClosedFist), ms(301)).is_committed());
        assert_eq!(m.state().mode(), Mode::Tree);
    }

    // ── pinch scenario ───────────────────────────────────────────────────
    #[test]
    fn pinch_opens_gallery_and_holds_through_grace() {
        let mut m = machine();
        let t = m.tick(Some(Pinch), ms(0));
        assert_eq!(t, Transition::Committed { mode_changed: false, gallery_changed: true });
        assert!(m.state().is_gallery_open());
        assert_eq!(m.state().status_text(), "Pinch");
        assert_eq!(m.state().last_mode_change(), None);

        for now in [1, 100, 250, 499] {
            assert_eq!(m.tick(None, ms(now)), Transition::HoldingPinch);
            assert!(m.state().is_gallery_open());
        }

        // Grace over, but the open started a cooldown that runs to 2000.
        assert!(!m.is_pinching(ms(500)));
        assert_eq!(
            m.tick(None, ms(501)),
            Transition::Suppressed { mode: Mode::Tree, gallery_open: false }
        );
        assert!(m.state().is_gallery_open());

        let t = m.tick(None, ms(2000));
        assert_eq!(t, Transition::Committed { mode_changed: false, gallery_changed: true });
        assert!(!m.state().is_gallery_open());
        assert_eq!(m.state().status_text(), "");
    }

    #[test]
    fn other_labels_keep_the_pinch_latched() {
        let mut m = machine();
        m.tick(Some(Pinch), ms(0));
        assert_eq!(m.tick(Some(Other), ms(200)), Transition::Unchanged);
        assert!(m.state().is_gallery_open());
        assert_eq!(m.state().status_text(), "Pinch");
    }

    #[test]
    fn pinch_latch_is_exactly_the_grace_window() {
        let mut m = machine();
        m.tick(Some(Pinch), ms(1000));
        assert!(m.is_pinching(ms(1000)));
        assert!(m.is_pinching(ms(1499)));
        assert!(!m.is_pinching(ms(1500)));
        m.tick(Some(Pinch), ms(1400));
        assert!(m.is_pinching(ms(1899)));
    }

    #[test]
    fn open_palm_ends_the_pinch() {
        let mut m = machine();
        m.tick(Some(Pinch), ms(0));
        assert_eq!(m.state().last_pinch(), Some(ms(0)));
        assert!(m.is_pinching(ms(100)));
        // Inside the cooldown the candidate is discarded, but the latch reset
        // has already happened.
        assert!(matches!(m.tick(Some(OpenPalm), ms(100)), Transition::Suppressed { .. }));
        assert!(!m.is_pinching(ms(101)));
        assert_eq!(m.state().last_pinch(), None);
    }

    #[test]
    fn open_palm_scatters_and_closes_gallery_together() {
        let mut m = GestureModeMachine::new(ModeTimings { cooldown: ms(50), ..ModeTimings::default() });
        m.tick(Some(Pinch), ms(0));
        assert!(m.state().is_gallery_open());

        let t = m.tick(Some(OpenPalm), ms(100));
        assert_eq!(t, Transition::Committed { mode_changed: true, gallery_changed: true });
        assert_eq!(m.state().mode(), Mode::Snow);
        assert!(!m.state().is_gallery_open());
        assert_eq!(m.state().status_text(), "Open_Palm");
    }

    // ── cosmetic status ──────────────────────────────────────────────────
    #[test]
    fn status_updates_ignore_cooldown() {
        let mut m = machine();
        m.tick(Some(OpenPalm), ms(0));
        assert_eq!(m.tick(Some(Other), ms(50)), Transition::StatusOnly);
        assert_eq!(m.state().status_text(), "Other");
        assert_eq!(m.tick(Some(Other), ms(60)), Transition::Unchanged);
        assert_eq!(m.tick(None, ms(70)), Transition::StatusOnly);
        assert_eq!(m.state().status_text(), "");
        assert_eq!(m.state().cooldown_until(), ms(2000));
    }

    // ── direct controls ──────────────────────────────────────────────────
    #[test]
    fn override_bypasses_cooldown_and_timers() {
        let mut m = machine();
        m.tick(Some(OpenPalm), ms(0));
        assert!(m.override_mode(Mode::Tree));
        assert_eq!(m.state().mode(), Mode::Tree);
        assert_eq!(m.state().cooldown_until(), ms(2000));
        assert_eq!(m.state().last_mode_change(), Some(ms(0)));
        assert!(!m.override_mode(Mode::Tree));
    }

    #[test]
    fn close_gallery_directly() {
        let mut m = machine();
        m.tick(Some(Pinch), ms(0));
        assert!(m.close_gallery());
        assert!(!m.state().is_gallery_open());
        assert!(!m.close_gallery());
    }

    // ── invariants under random input ────────────────────────────────────
    #[test]
    fn random_streams_respect_debounce_and_cooldown() {
        let timings = ModeTimings::default();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut m = GestureModeMachine::new(timings);
            let mut now = Duration::ZERO;
            let mut last_structural: Option<Duration> = None;
            let mut last_mode: Option<Duration> = None;

            for _ in 0..3000 {
                now += ms(rng.gen_range(5..60));
                let label = match rng.gen_range(0..6) {
                    0 => Some(OpenPalm),
                    1 => Some(ClosedFist),
                    2 => Some(Pinch),
                    3 => Some(Other),
                    _ => None,
                };
                let before = m.state().clone();
                let t = m.tick(label, now);
                let after = m.state();

                let structural = before.mode() != after.mode()
                    || before.is_gallery_open() != after.is_gallery_open();
                assert_eq!(structural, t.is_committed());

                if structural {
                    if let Some(prev) = last_structural {
                        assert!(now - prev >= timings.cooldown, "cooldown broken at {now:?}");
                    }
                    last_structural = Some(now);
                }
                if before.mode() != after.mode() {
                    if let Some(prev) = last_mode {
                        assert!(now - prev > timings.debounce, "debounce broken at {now:?}");
                    }
                    last_mode = Some(now);
                }
                if after.is_gallery_open() != before.is_gallery_open() && after.is_gallery_open() {
                    assert!(m.is_pinching(now));
                }
            }
        }
    }
}
