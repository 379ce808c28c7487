//! Control-panel state: the user-facing knobs that are not gestures.

use tinsel_field::Rgb;

use crate::sprite::ParticleShape;

/// Needle colours offered by the colour button, in cycle order.
pub const COLOR_CYCLE: [&str; 5] = ["#90EE90", "#FF69B4", "#87CEEB", "#FFD700", "#FFFFFF"];

pub const SIZE_STEP: f32 = 0.5;
pub const SIZE_MIN:  f32 = 0.0;
pub const SIZE_MAX:  f32 = 20.0;

// ════════════════════════════════════════════════════════════════════════════
// ControlAction
// ════════════════════════════════════════════════════════════════════════════

/// A discrete control-panel command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlAction {
    /// Flip Tree/Snow directly, bypassing the gesture cooldown.
    ToggleMode,
    /// Start or stop the gesture classifier.
    ToggleFeed,
    NextColor,
    NextShape,
    Grow,
    Shrink,
    AddPhoto,
    /// Remove every photo; also closes the gallery.
    ClearPhotos,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Controls
// ════════════════════════════════════════════════════════════════════════════

/// Current control-panel values, read once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Controls {
    pub color:  Rgb,
    pub shape:  ParticleShape,
    pub size:   f32,
    pub photos: Vec<String>,
    color_slot: usize,
    next_photo: usize,
}

impl Controls {
    pub fn new(color: Rgb, shape: ParticleShape, size: f32, photos: Vec<String>) -> Self {
        let hex = color.to_hex();
        let color_slot = COLOR_CYCLE
            .iter()
            .position(|c| c.eq_ignore_ascii_case(&hex))
            .unwrap_or(COLOR_CYCLE.len() - 1);
        // Never reissue an id already in the list.
        let next_photo = photos
            .iter()
            .filter_map(|id| id.strip_prefix("photo-")?.parse::<usize>().ok())
            .max()
            .unwrap_or(0)
            .max(photos.len());
        Controls { color, shape, size, photos, color_slot, next_photo }
    }

    /// Advance to the next colour in [`COLOR_CYCLE`].
    pub fn next_color(&mut self) {
        self.color_slot = (self.color_slot + 1) % COLOR_CYCLE.len();
        // Constant table entries always parse.
        if let Ok(c) = Rgb::from_hex(COLOR_CYCLE[self.color_slot]) {
            self.color = c;
        }
    }

    pub fn next_shape(&mut self) {
        self.shape = self.shape.next();
    }

    pub fn grow(&mut self) {
        self.size = (self.size + SIZE_STEP).min(SIZE_MAX);
    }

    pub fn shrink(&mut self) {
        self.size = (self.size - SIZE_STEP).max(SIZE_MIN);
    }

    /// Append a fresh photo identifier and return it.
    pub fn add_photo(&mut self) -> &str {
        self.next_photo += 1;
        self.photos.push(format!("photo-{}", self.next_photo));
        &self.photos[self.photos.len() - 1]
    }

    /// Remove every photo; returns how many were removed.
    pub fn clear_photos(&mut self) -> usize {
        std::mem::take(&mut self.photos).len()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use tinsel_field::palette;

    fn controls() -> Controls {
        Controls::new(palette::TREE_GREEN, ParticleShape::Snowflake, 5.0, Vec::new())
    }

    #[test]
    fn colour_cycles_from_current() {
        let mut c = controls();
        c.next_color();
        assert_eq!(c.color.to_hex(), "#ff69b4");
        for _ in 0..4 {
            c.next_color();
        }
        assert_eq!(c.color, palette::TREE_GREEN);
    }

    #[test]
    fn unknown_colour_starts_cycle_at_top() {
        let mut c = Controls::new(palette::SOCK_RED, ParticleShape::Star, 5.0, Vec::new());
        c.next_color();
        assert_eq!(c.color, palette::TREE_GREEN);
    }

    #[test]
    fn size_is_clamped() {
        let mut c = controls();
        for _ in 0..100 {
            c.shrink();
        }
        assert_eq!(c.size, SIZE_MIN);
        for _ in 0..100 {
            c.grow();
        }
        assert_eq!(c.size, SIZE_MAX);
    }

    #[test]
    fn photos_get_unique_ids_after_clear() {
        let mut c = Controls::new(palette::TREE_GREEN, ParticleShape::Circle, 5.0, vec!["x".into()]);
        assert_eq!(c.add_photo(), "photo-2");
        assert_eq!(c.clear_photos(), 2);
        assert!(c.photos.is_empty());
        assert_eq!(c.add_photo(), "photo-3");
    }

    #[test]
    fn photo_ids_skip_configured_ones() {
        let mut c = Controls::new(palette::TREE_GREEN, ParticleShape::Circle, 5.0, vec!["photo-2".into()]);
        assert_eq!(c.add_photo(), "photo-3");
        assert_eq!(c.photos, ["photo-2", "photo-3"]);

        let mut c = Controls::new(palette::TREE_GREEN, ParticleShape::Circle, 5.0, vec!["photo-x".into(), "photo-7".into()]);
        assert_eq!(c.add_photo(), "photo-8");
    }

    #[test]
    fn shape_cycles() {
        let mut c = controls();
        c.next_shape();
        assert_eq!(c.shape, ParticleShape::Circle);
    }
}
