//! One-time construction of the tree and snow layouts.
//!
//! Particle data is stored as parallel arrays indexed by particle id.  The
//! layout half (`tree_positions`, `snow_speeds`, `decorations`) is fixed at
//! construction; only the animator touches the live half (`snow_positions`,
//! `current_positions`).

use std::f32::consts::TAU;

use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::color::{palette, Rgb};
use crate::FieldParams;

// ════════════════════════════════════════════════════════════════════════════
// Decorations
// ════════════════════════════════════════════════════════════════════════════

/// What a particle represents while assembled into the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecorationType {
    Needle,
    RibbonSilver,
    BellGold,
    SockRed,
    SockWhite,
}

impl DecorationType {
    pub const ALL: [DecorationType; 5] = [
        DecorationType::Needle,
        DecorationType::RibbonSilver,
        DecorationType::BellGold,
        DecorationType::SockRed,
        DecorationType::SockWhite,
    ];

    /// Decorations render larger than needles while the tree is assembled.
    pub fn is_ornament(self) -> bool {
        self != DecorationType::Needle
    }

    /// Fixed palette colour for ornaments; needles get a jittered green instead.
    pub fn palette_color(self) -> Rgb {
        match self {
            DecorationType::Needle       => palette::TREE_GREEN,
            DecorationType::RibbonSilver => palette::RIBBON_SILVER,
            DecorationType::BellGold     => palette::BELL_GOLD,
            DecorationType::SockRed      => palette::SOCK_RED,
            DecorationType::SockWhite    => palette::SOCK_WHITE,
        }
    }

    /// Pick a decoration from the spread offsets and one uniform draw `r`.
    ///
    /// Rules are checked in priority order; the first match wins.
    pub fn classify(spread_x: f32, spread_z: f32, r: f32) -> DecorationType {
        let on_centerline = spread_x.abs() < 0.4 && spread_z.abs() < 0.4;
        if on_centerline && r > 0.4 {
            DecorationType::RibbonSilver
        } else if r > 0.96 {
            DecorationType::BellGold
        } else if r > 0.94 {
            DecorationType::SockRed
        } else if r > 0.92 {
            DecorationType::SockWhite
        } else {
            DecorationType::Needle
        }
    }
}

/// A decoration together with the colour it was generated with.
///
/// `base_color` is only rendered for ornaments; needles follow the live
/// user colour instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoration {
    pub kind:       DecorationType,
    pub base_color: Rgb,
}

// ════════════════════════════════════════════════════════════════════════════
// Particle: a read-only snapshot of one index
// ════════════════════════════════════════════════════════════════════════════

/// Everything known about one particle at the moment of the call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub index:            usize,
    pub tree_position:    Vec3,
    pub snow_speed:       f32,
    pub snow_position:    Vec3,
    pub current_position: Vec3,
    pub decoration:       Decoration,
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleField
// ════════════════════════════════════════════════════════════════════════════

/// The particle population: fixed layouts plus live animation state.
#[derive(Clone, Debug)]
pub struct ParticleField {
    tree_positions: Vec<Vec3>,
    snow_speeds:    Vec<f32>,
    decorations:    Vec<Decoration>,

    pub(crate) snow_positions:    Vec<Vec3>,
    pub(crate) current_positions: Vec<Vec3>,
}

impl ParticleField {
    /// Build both layouts for `params.particle_count` particles.
    ///
    /// Deterministic for a given `(params, seed)`.  Every particle starts
    /// rendered at its snow position.
    pub fn generate(params: &FieldParams, seed: u64) -> Self {
        let n = params.particle_count;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut tree_positions = Vec::with_capacity(n);
        let mut snow_positions = Vec::with_capacity(n);
        let mut snow_speeds    = Vec::with_capacity(n);
        let mut decorations    = Vec::with_capacity(n);

        let extent = params.snow_extent;

        for i in 0..n {
            // ── tree spiral ──────────────────────────────────────────────
            let t      = i as f32 / n as f32;
            let angle  = t * params.turns * TAU;
            let y      = t * params.height - params.height / 2.0;
            let radius = params.base_radius * (1.0 - t) + 0.1;

            let taper    = params.ribbon_width * (1.0 - 0.5 * t);
            let spread_x = (rng.gen::<f32>() - 0.5) * taper;
            let spread_y = (rng.gen::<f32>() - 0.5) * 1.5;
            let spread_z = (rng.gen::<f32>() - 0.5) * taper;

            tree_positions.push(Vec3::new(
                radius * angle.cos() + spread_x,
                y + spread_y,
                radius * angle.sin() + spread_z,
            ));

            // ── snow volume ──────────────────────────────────────────────
            snow_positions.push(Vec3::new(
                rng.gen_range(-extent..extent),
                rng.gen_range(-extent..extent),
                rng.gen_range(-extent..extent),
            ));

            // ── decoration ───────────────────────────────────────────────
            let kind = DecorationType::classify(spread_x, spread_z, rng.gen::<f32>());
            let base_color = match kind {
                DecorationType::Needle => {
                    palette::TREE_GREEN.offset_lightness(rng.gen_range(-0.05..0.05))
                }
                other => other.palette_color(),
            };
            decorations.push(Decoration { kind, base_color });

            snow_speeds.push(rng.gen_range(params.snow_speed_min..params.snow_speed_max));
        }

        log::debug!(
            "generated {} particles (seed {}): {} ornaments",
            n,
            seed,
            decorations.iter().filter(|d| d.kind.is_ornament()).count()
        );

        ParticleField {
            tree_positions,
            snow_speeds,
            decorations,
            current_positions: snow_positions.clone(),
            snow_positions,
        }
    }

    pub fn len(&self) -> usize {
        self.tree_positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree_positions.is_empty()
    }

    pub fn particle(&self, index: usize) -> Option<Particle> {
        Some(Particle {
            index,
            tree_position:    *self.tree_positions.get(index)?,
            snow_speed:       self.snow_speeds[index],
            snow_position:    self.snow_positions[index],
            current_position: self.current_positions[index],
            decoration:       self.decorations[index],
        })
    }

    pub fn tree_positions(&self)    -> &[Vec3]       { &self.tree_positions }
    pub fn snow_speeds(&self)       -> &[f32]        { &self.snow_speeds }
    pub fn decorations(&self)       -> &[Decoration] { &self.decorations }
    pub fn snow_positions(&self)    -> &[Vec3]       { &self.snow_positions }
    pub fn current_positions(&self) -> &[Vec3]       { &self.current_positions }

    /// Count of each decoration type, in [`DecorationType::ALL`] order.
    pub fn decoration_histogram(&self) -> [usize; 5] {
        let mut counts = [0usize; 5];
        for d in &self.decorations {
            let slot = DecorationType::ALL.iter().position(|k| *k == d.kind).unwrap_or(0);
            counts[slot] += 1;
        }
        counts
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
