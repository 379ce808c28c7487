//! Per-frame particle update.
//!
//! One flat pass over every particle index: pick the target for the current
//! mode, ease the rendered position toward it, then derive spin, pulse and
//! colour.  All N entries of the output buffers are rewritten every frame so
//! transform and colour always describe the same particle.

use glam::{Vec2, Vec3};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::color::{palette, Rgb};
use crate::field::ParticleField;
use crate::{FieldParams, Mode};

// ════════════════════════════════════════════════════════════════════════════
// Parameters and inputs
// ════════════════════════════════════════════════════════════════════════════

/// Tuning for [`ParticleAnimator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorParams {
    /// Fraction of the remaining distance covered per frame in Tree mode.
    pub tree_lerp: f32,
    /// Same, in Snow mode.
    pub snow_lerp: f32,
    /// Amplitude of the idle sway on the assembled tree.
    pub idle_wave: f32,
    /// Amplitude of the horizontal wind drift on falling snow.
    pub wind: f32,
    /// Keep drifting the hidden snow state while the tree is shown.
    pub wind_while_assembled: bool,
    /// Scale multiplier for ornaments while in Tree mode.
    pub ornament_scale: f32,
}

impl Default for AnimatorParams {
    fn default() -> Self {
        AnimatorParams {
            tree_lerp:            0.08,
            snow_lerp:            0.8,
            idle_wave:            0.15,
            wind:                 0.03,
            wind_while_assembled: true,
            ornament_scale:       2.0,
        }
    }
}

/// Configuration snapshot read once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInputs {
    pub mode:       Mode,
    /// Needle colour while assembled.
    pub user_color: Rgb,
    /// User particle size; 5.0 is unit scale.
    pub size_scale: f32,
    /// Seconds since start.
    pub time:       f32,
}

// ════════════════════════════════════════════════════════════════════════════
// Output buffers
// ════════════════════════════════════════════════════════════════════════════

/// Renderer-facing per-instance arrays, all of length N.
#[derive(Clone, Debug, Default)]
pub struct InstanceBuffers {
    pub positions: Vec<Vec3>,
    /// Euler spin about x and y.
    pub rotations: Vec<Vec2>,
    pub scales:    Vec<f32>,
    pub colors:    Vec<Rgb>,
}

/// One particle's slice of [`InstanceBuffers`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub position: Vec3,
    pub rotation: Vec2,
    pub scale:    f32,
    pub color:    Rgb,
}

impl InstanceBuffers {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Instance> {
        Some(Instance {
            position: *self.positions.get(index)?,
            rotation: *self.rotations.get(index)?,
            scale:    *self.scales.get(index)?,
            color:    *self.colors.get(index)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Instance> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    fn resize(&mut self, n: usize) {
        self.positions.resize(n, Vec3::ZERO);
        self.rotations.resize(n, Vec2::ZERO);
        self.scales.resize(n, 0.0);
        self.colors.resize(n, palette::SNOW_WHITE);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleAnimator
// ════════════════════════════════════════════════════════════════════════════

/// Drives a [`ParticleField`] frame by frame.
///
/// Owns the RNG used to re-scatter flakes that fall through the floor, so a
/// run is reproducible from the seed.
pub struct ParticleAnimator {
    params: AnimatorParams,
    extent: f32,
    rng:    StdRng,
}

impl ParticleAnimator {
    pub fn new(field: &FieldParams, seed: u64) -> Self {
        Self::with_params(field, AnimatorParams::default(), seed)
    }

    pub fn with_params(field: &FieldParams, params: AnimatorParams, seed: u64) -> Self {
        ParticleAnimator {
            params,
            extent: field.snow_extent,
            // Offset so the wrap stream never replays the generator's draws.
            rng: StdRng::seed_from_u64(seed ^ 0x5EED_F1A4_E5u64),
        }
    }

    /// Advance every particle by one frame and rewrite `out`.
    pub fn step(&mut self, field: &mut ParticleField, inputs: &FrameInputs, out: &mut InstanceBuffers) {
        let n = field.len();
        out.resize(n);

        let time = inputs.time;
        let snow = inputs.mode == Mode::Snow;
        let lerp = if snow { self.params.snow_lerp } else { self.params.tree_lerp };
        let size = (inputs.size_scale / 5.0).max(0.0);

        for i in 0..n {
            // ── target ───────────────────────────────────────────────────
            let target = if snow {
                self.fall(field, i, time)
            } else {
                if self.params.wind_while_assembled {
                    self.drift(field, i, time);
                }
                let home = field.tree_positions()[i];
                let wave = (time * 2.0 + home.y * 0.5).sin() * self.params.idle_wave;
                home + Vec3::new(wave, 0.0, wave)
            };

            // ── ease toward it ───────────────────────────────────────────
            let current = &mut field.current_positions[i];
            *current += (target - *current) * lerp;
            let position = *current;

            // ── spin, pulse, colour ──────────────────────────────────────
            let phase = i as f32;
            let decoration = field.decorations()[i];

            let mut scale = ((time * 3.0 + phase).sin() * 0.2 + 1.0) * size;
            if !snow && decoration.kind.is_ornament() {
                scale *= self.params.ornament_scale;
            }

            let color = if snow {
                palette::SNOW_WHITE
            } else if decoration.kind.is_ornament() {
                decoration.base_color
            } else {
                inputs.user_color
            };

            out.positions[i] = position;
            out.rotations[i] = Vec2::new(time * 0.5 + phase, time * 0.3 + phase);
            out.scales[i]    = scale;
            out.colors[i]    = color;
        }
    }

    /// Gravity, floor wrap, and wind on the live snow state; returns it.
    fn fall(&mut self, field: &mut ParticleField, i: usize, time: f32) -> Vec3 {
        let speed = field.snow_speeds()[i];
        let extent = self.extent;
        let flake = &mut field.snow_positions[i];
        flake.y -= speed;
        if flake.y < -extent {
            flake.y = extent;
            flake.x = self.rng.gen_range(-extent..extent);
            flake.z = self.rng.gen_range(-extent..extent);
        }
        self.drift(field, i, time);
        field.snow_positions[i]
    }

    fn drift(&self, field: &mut ParticleField, i: usize, time: f32) {
        let flake = &mut field.snow_positions[i];
        flake.x += (time + flake.x * 0.5).sin() * self.params.wind;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
