//! Staggered reveal and fan layout of the photo gallery.
//!
//! Items fan out on a shallow arc in front of the camera.  When the gallery
//! opens, item `i` waits `i · stagger` before it starts revealing; closing
//! hides everything at once.

use std::time::Duration;

use glam::Vec3;

/// Widest total arc of the fan.
const FAN_SPREAD_DEG: f32 = 120.0;
/// Widest gap between neighbours.
const FAN_MAX_STEP_DEG: f32 = 20.0;
const FAN_RADIUS_X:   f32 = 12.0;
const FAN_RADIUS_Y:   f32 = 3.0;
const FAN_DROP_Y:     f32 = 2.0;
const FAN_DEPTH_STEP: f32 = 0.1;
const BOB_AMPLITUDE:  f32 = 0.2;

// ════════════════════════════════════════════════════════════════════════════
// Fan placement
// ════════════════════════════════════════════════════════════════════════════

/// Position and z-rotation (radians) of item `index` in a fan of `total`.
///
/// `z` grows strictly with `index`, so later items always draw on top.
pub fn fan_placement(index: usize, total: usize) -> (Vec3, f32) {
    let step = if total <= 1 {
        0.0
    } else {
        (FAN_SPREAD_DEG / (total - 1) as f32).min(FAN_MAX_STEP_DEG).to_radians()
    };
    let start = -(total.saturating_sub(1) as f32) * step / 2.0;
    let angle = start + index as f32 * step;
    let position = Vec3::new(
        angle.sin() * FAN_RADIUS_X,
        angle.cos() * FAN_RADIUS_Y - FAN_DROP_Y,
        index as f32 * FAN_DEPTH_STEP,
    );
    (position, -angle)
}

// ════════════════════════════════════════════════════════════════════════════
// GalleryTimings
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GalleryTimings {
    /// Delay between consecutive items starting to reveal.
    pub stagger:     Duration,
    /// Exponential smoothing rate of `reveal_progress`, per second.
    pub reveal_rate: f32,
}

impl Default for GalleryTimings {
    fn default() -> Self {
        GalleryTimings { stagger: Duration::from_millis(1000), reveal_rate: 6.0 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GalleryItem
// ════════════════════════════════════════════════════════════════════════════

/// One photo slot in the fan.
#[derive(Clone, Debug, PartialEq)]
pub struct GalleryItem {
    pub photo_id:        String,
    pub fan_index:       usize,
    pub total:           usize,
    pub fan_position:    Vec3,
    pub fan_rotation_z:  f32,
    /// 0 = hidden, 1 = fully shown.
    pub reveal_progress: f32,
    pub active:          bool,
    /// `fan_position` plus the bob while active.
    pub render_position: Vec3,
}

impl GalleryItem {
    fn new(photo_id: String, fan_index: usize, total: usize) -> Self {
        let (fan_position, fan_rotation_z) = fan_placement(fan_index, total);
        GalleryItem {
            photo_id,
            fan_index,
            total,
            fan_position,
            fan_rotation_z,
            reveal_progress: 0.0,
            active: false,
            render_position: fan_position,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.reveal_progress > 1e-3
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GalleryFan
// ════════════════════════════════════════════════════════════════════════════

/// Schedules the reveal of every photo in the active set.
#[derive(Clone, Debug, Default)]
pub struct GalleryFan {
    items:     Vec<GalleryItem>,
    timings:   GalleryTimings,
    was_open:  bool,
    opened_at: Option<Duration>,
}

impl GalleryFan {
    pub fn new(timings: GalleryTimings) -> Self {
        GalleryFan { timings, ..GalleryFan::default() }
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// When the gallery last went from closed to open.
    pub fn opened_at(&self) -> Option<Duration> {
        self.opened_at
    }

    /// Replace the active photo set.
    ///
    /// Items whose id and slot are unchanged keep their reveal state and are
    /// re-laid out for the new count; all others are created fresh at
    /// progress 0.  Removed photos are dropped.
    pub fn sync_photos(&mut self, photos: &[String]) {
        let total = photos.len();
        let unchanged = self.items.len() == total
            && self.items.iter().zip(photos).all(|(item, id)| &item.photo_id == id);
        if unchanged {
            return;
        }

        let previous = std::mem::take(&mut self.items);
        self.items = photos
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let mut item = GalleryItem::new(id.clone(), i, total);
                if let Some(old) = previous.get(i).filter(|old| &old.photo_id == id) {
                    item.reveal_progress = old.reveal_progress;
                    item.active = old.active;
                }
                item
            })
            .collect();
        log::debug!("gallery now holds {} photo(s)", total);
    }

    /// Advance one frame.
    ///
    /// `now` is the session clock used for the stagger schedule, `time` the
    /// animation clock in seconds used for the bob, `dt` the frame length in
    /// seconds.
    pub fn update(&mut self, is_open: bool, now: Duration, time: f32, dt: f32) {
        if is_open && !self.was_open {
            self.opened_at = Some(now);
        }
        self.was_open = is_open;

        let k = (self.timings.reveal_rate * dt).clamp(0.0, 1.0);
        let stagger = self.timings.stagger;
        let opened_at = self.opened_at;

        for item in &mut self.items {
            item.active = is_open
                && opened_at.is_some_and(|t| now >= t + stagger * item.fan_index as u32);
            let desired = if item.active { 1.0 } else { 0.0 };
            item.reveal_progress += (desired - item.reveal_progress) * k;

            item.render_position = item.fan_position;
            if item.active {
                item.render_position.y += (time * 2.0 + item.fan_index as f32).sin() * BOB_AMPLITUDE;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn photos(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("photo-{i}")).collect()
    }

    fn fan(n: usize) -> GalleryFan {
        let mut f = GalleryFan::default();
        f.sync_photos(&photos(n));
        f
    }

    // ── placement ────────────────────────────────────────────────────────
    #[test]
    fn single_item_sits_centred() {
        let (p, rot) = fan_placement(0, 1);
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
        assert_eq!(p.z, 0.0);
        assert_eq!(rot, 0.0);
    }

    #[test]
    fn step_is_capped_at_twenty_degrees() {
        // 3 items: 120/2 = 60° would be allowed by the spread, cap wins.
        let (_, r0) = fan_placement(0, 3);
        let (_, r2) = fan_placement(2, 3);
        assert!((r0 - 20f32.to_radians()).abs() < 1e-5);
        assert!((r2 + 20f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn large_fans_share_the_spread() {
        let total = 13; // 120/12 = 10°
        let (_, first) = fan_placement(0, total);
        let (_, last) = fan_placement(total - 1, total);
        assert!((first - 60f32.to_radians()).abs() < 1e-5);
        assert!((last + 60f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn fan_is_symmetric_and_depth_ordered() {
        let total = 6;
        for i in 0..total {
            let (p, rot) = fan_placement(i, total);
            let (q, mirror) = fan_placement(total - 1 - i, total);
            assert!((p.x + q.x).abs() < 1e-4);
            assert!((p.y - q.y).abs() < 1e-4);
            assert!((rot + mirror).abs() < 1e-5);
            if i > 0 {
                assert!(p.z > fan_placement(i - 1, total).0.z);
            }
        }
    }

    #[test]
    fn rotation_counters_angle() {
        let (p, rot) = fan_placement(0, 4);
        // Left of centre (negative angle) tilts positive.
        assert!(p.x < 0.0);
        assert!(rot > 0.0);
    }

    // ── reveal schedule ──────────────────────────────────────────────────
    #[test]
    fn items_activate_on_stagger() {
        let mut f = fan(3);
        f.update(true, ms(5000), 0.0, DT);
        assert_eq!(f.opened_at(), Some(ms(5000)));
        let active = |f: &GalleryFan| f.items().iter().map(|i| i.active).collect::<Vec<_>>();
        assert_eq!(active(&f), [true, false, false]);

        f.update(true, ms(5999), 0.0, DT);
        assert_eq!(active(&f), [true, false, false]);
        f.update(true, ms(6000), 0.0, DT);
        assert_eq!(active(&f), [true, true, false]);
        f.update(true, ms(7000), 0.0, DT);
        assert_eq!(active(&f), [true, true, true]);
        // Staying open does not restart the schedule.
        assert_eq!(f.opened_at(), Some(ms(5000)));
    }

    #[test]
    fn close_deactivates_everything_at_once() {
        let mut f = fan(3);
        f.update(true, ms(0), 0.0, DT);
        f.update(true, ms(2500), 0.0, DT);
        f.update(false, ms(2516), 0.0, DT);
        assert!(f.items().iter().all(|i| !i.active));
    }

    #[test]
    fn reopening_restarts_stagger() {
        let mut f = fan(2);
        f.update(true, ms(0), 0.0, DT);
        f.update(true, ms(1500), 0.0, DT);
        f.update(false, ms(1600), 0.0, DT);
        f.update(true, ms(3000), 0.0, DT);
        assert_eq!(f.opened_at(), Some(ms(3000)));
        assert!(f.items()[0].active);
        assert!(!f.items()[1].active);
    }

    #[test]
    fn progress_eases_in_and_out() {
        let mut f = fan(1);
        let mut last = 0.0;
        for frame in 0..120u64 {
            f.update(true, ms(frame * 16), frame as f32 * DT, DT);
            let p = f.items()[0].reveal_progress;
            assert!(p >= last && p <= 1.0);
            last = p;
        }
        assert!(last > 0.99);

        for frame in 120..240u64 {
            f.update(false, ms(frame * 16), frame as f32 * DT, DT);
            let p = f.items()[0].reveal_progress;
            assert!(p <= last && p >= 0.0);
            last = p;
        }
        assert!(last < 0.01);
        assert!(!f.items()[0].is_visible());
    }

    #[test]
    fn huge_dt_snaps_without_overshoot() {
        let mut f = fan(1);
        f.update(true, ms(0), 0.0, 10.0);
        assert_eq!(f.items()[0].reveal_progress, 1.0);
    }

    #[test]
    fn bob_applies_only_while_active() {
        let mut f = fan(2);
        let time = 0.7;
        f.update(true, ms(0), time, DT);
        let a = &f.items()[0];
        let expected = a.fan_position.y + (time * 2.0).sin() * 0.2;
        assert!((a.render_position.y - expected).abs() < 1e-5);
        let b = &f.items()[1];
        assert_eq!(b.render_position, b.fan_position);
    }

    // ── photo set changes ────────────────────────────────────────────────
    #[test]
    fn sync_keeps_unchanged_items() {
        let mut f = fan(2);
        f.update(true, ms(0), 0.0, 1.0);
        let shown = f.items()[0].reveal_progress;
        assert!(shown > 0.0);

        f.sync_photos(&photos(2));
        assert_eq!(f.items()[0].reveal_progress, shown);
    }

    #[test]
    fn adding_a_photo_keeps_shown_cards_and_relayouts() {
        let mut f = fan(2);
        for i in 0..60 {
            f.update(true, ms(i * 16), i as f32 * DT, DT);
        }
        let shown = f.items()[0].reveal_progress;
        assert!(shown > 0.99);

        f.sync_photos(&photos(3));
        assert_eq!(f.len(), 3);
        assert_eq!(f.items()[0].reveal_progress, shown);
        assert!(f.items()[0].active);
        assert_eq!(f.items()[2].reveal_progress, 0.0);
        for (i, item) in f.items().iter().enumerate() {
            assert_eq!(item.total, 3);
            assert_eq!(item.fan_index, i);
            assert_eq!(item.fan_position, fan_placement(i, 3).0);
            assert_eq!(item.fan_rotation_z, fan_placement(i, 3).1);
        }
    }

    #[test]
    fn removing_a_photo_drops_only_that_card() {
        let mut f = fan(3);
        f.update(true, ms(0), 0.0, 1.0);
        let shown = f.items()[0].reveal_progress;

        f.sync_photos(&photos(2));
        assert_eq!(f.len(), 2);
        assert_eq!(f.items()[0].reveal_progress, shown);
        assert_eq!(f.items()[1].total, 2);
    }

    #[test]
    fn empty_photo_list_is_empty_gallery() {
        let mut f = fan(3);
        f.sync_photos(&[]);
        assert!(f.is_empty());
        f.update(true, ms(0), 0.0, DT);
        assert!(f.items().is_empty());
    }
}
