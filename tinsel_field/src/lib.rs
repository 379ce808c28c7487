//! # tinsel_field
//!
//! Two particle formations and the per-frame morph between them:
//!
//! * **Tree**: a conical spiral ribbon, tapering to a point at the top,
//!   sprinkled with decorations (silver ribbon, gold bells, red and white
//!   socks) among the green needles.
//! * **Snow**: a cube of independently falling flakes that wrap from the
//!   floor back to the ceiling.
//!
//! [`ParticleField::generate`] builds both layouts once from a seed.
//! [`ParticleAnimator::step`] then runs every frame, steering every particle
//! toward whichever layout the current [`Mode`] selects and writing the
//! renderer-facing [`InstanceBuffers`].
//!
//! ## Quick start
//!
//! ```rust
//! use tinsel_field::{FieldParams, FrameInputs, InstanceBuffers, Mode, ParticleAnimator, ParticleField, palette};
//!
//! let params = FieldParams { particle_count: 200, ..FieldParams::default() };
//! let mut field = ParticleField::generate(&params, 7);
//! let mut animator = ParticleAnimator::new(&params, 7);
//! let mut out = InstanceBuffers::default();
//!
//! let inputs = FrameInputs {
//!     mode: Mode::Tree,
//!     user_color: palette::TREE_GREEN,
//!     size_scale: 5.0,
//!     time: 0.0,
//! };
//! animator.step(&mut field, &inputs, &mut out);
//! assert_eq!(out.len(), 200);
//! ```

pub mod animator;
pub mod color;
pub mod field;

pub use animator::{AnimatorParams, FrameInputs, Instance, InstanceBuffers, ParticleAnimator};
pub use color::{palette, ColorParseError, Rgb};
pub use field::{Decoration, DecorationType, Particle, ParticleField};

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Mode: which formation the particles are heading for
// ════════════════════════════════════════════════════════════════════════════

/// The formation every particle is currently steering toward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Assembled into the spiral tree.
    #[default]
    Tree,
    /// Scattered as falling snow.
    Snow,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Tree => "Tree",
            Mode::Snow => "Snow",
        }
    }

    /// The other formation.
    pub fn toggled(self) -> Mode {
        match self {
            Mode::Tree => Mode::Snow,
            Mode::Snow => Mode::Tree,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FieldParams: shape of the two layouts
// ════════════════════════════════════════════════════════════════════════════

/// Geometry of the tree spiral and the snow volume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    /// Number of particles N.
    pub particle_count: usize,
    /// Total tree height; the tree is centred on y = 0.
    pub height: f32,
    /// Spiral radius at the base.
    pub base_radius: f32,
    /// Full turns of the spiral from base to tip.
    pub turns: f32,
    /// Lateral width of the ribbon at the base (halves toward the tip).
    pub ribbon_width: f32,
    /// Half-extent of the snow cube on each axis.
    pub snow_extent: f32,
    /// Per-frame fall speed range `[min, max)`.
    pub snow_speed_min: f32,
    pub snow_speed_max: f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        FieldParams {
            particle_count: 5500,
            height:         35.0,
            base_radius:    12.0,
            turns:          9.0,
            ribbon_width:   3.0,
            snow_extent:    25.0,
            snow_speed_min: 0.05,
            snow_speed_max: 0.2,
        }
    }
}
