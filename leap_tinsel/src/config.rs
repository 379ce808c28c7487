//! Application configuration, loadable from JSON.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! { "particle_color": "#FF69B4", "field": { "particle_count": 3000 } }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tinsel_field::{AnimatorParams, FieldParams, Mode, Rgb};
use tinsel_mode::{GalleryTimings, ModeTimings};

use crate::error::AppError;
use crate::sprite::ParticleShape;

pub const DEFAULT_WIN_W: usize = 1024;
pub const DEFAULT_WIN_H: usize = 720;

// ════════════════════════════════════════════════════════════════════════════
// TimingConfig: millisecond knobs of the state machine and gallery
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub debounce_ms:        u64,
    pub pinch_grace_ms:     u64,
    pub cooldown_ms:        u64,
    pub gallery_stagger_ms: u64,
    /// Reveal smoothing rate per second.
    pub gallery_reveal_rate: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            debounce_ms:         300,
            pinch_grace_ms:      500,
            cooldown_ms:         2000,
            gallery_stagger_ms:  1000,
            gallery_reveal_rate: 6.0,
        }
    }
}

impl TimingConfig {
    pub fn mode_timings(&self) -> ModeTimings {
        ModeTimings {
            debounce:    Duration::from_millis(self.debounce_ms),
            pinch_grace: Duration::from_millis(self.pinch_grace_ms),
            cooldown:    Duration::from_millis(self.cooldown_ms),
        }
    }

    pub fn gallery_timings(&self) -> GalleryTimings {
        GalleryTimings {
            stagger:     Duration::from_millis(self.gallery_stagger_ms),
            reveal_rate: self.gallery_reveal_rate,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub field:    FieldParams,
    pub animator: AnimatorParams,
    pub timings:  TimingConfig,

    /// Starting formation.
    pub mode:           Mode,
    /// Needle colour in Tree mode, `#rrggbb`.
    pub particle_color: String,
    pub particle_shape: ParticleShape,
    /// Particle size; 5 is the natural sprite size, ≤ 0 hides particles.
    pub particle_size:  f32,
    /// Photo identifiers shown in the gallery fan, in order.
    pub photos:         Vec<String>,

    pub seed:          u64,
    pub window_width:  usize,
    pub window_height: usize,
    /// Start with the gesture classifier running.
    pub gesture_feed:  bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            field:          FieldParams::default(),
            animator:       AnimatorParams::default(),
            timings:        TimingConfig::default(),
            mode:           Mode::Tree,
            particle_color: "#90EE90".to_string(),
            particle_shape: ParticleShape::Snowflake,
            particle_size:  5.0,
            photos:         Vec::new(),
            seed:           2024,
            window_width:   DEFAULT_WIN_W,
            window_height:  DEFAULT_WIN_H,
            gesture_feed:   true,
        }
    }
}

impl AppConfig {
    /// Load a JSON config; missing keys take their defaults.
    pub fn load_json(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)
            .map_err(|source| AppError::ConfigIo { path: path.to_path_buf(), source })?;
        let cfg: AppConfig = serde_json::from_str(&json)
            .map_err(|source| AppError::ConfigParse { path: path.to_path_buf(), source })?;
        log::info!("loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn to_json_pretty(&self) -> Result<String, AppError> {
        serde_json::to_string_pretty(self).map_err(AppError::ConfigWrite)
    }

    /// Parsed needle colour.
    pub fn color(&self) -> Result<Rgb, AppError> {
        Ok(Rgb::from_hex(&self.particle_color)?)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
