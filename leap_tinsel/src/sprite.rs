//! Procedural sprite masks for the particle shapes.
//!
//! Each mask is a square grid of coverage values in `0.0..=1.0`, drawn
//! once at start-up and then splatted for every particle.

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// ParticleShape
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleShape {
    /// Six arms with two pairs of side branches each.
    #[default]
    Snowflake,
    Circle,
    /// Five-pointed star.
    Star,
}

impl ParticleShape {
    pub const ALL: [ParticleShape; 3] =
        [ParticleShape::Snowflake, ParticleShape::Circle, ParticleShape::Star];

    pub fn name(self) -> &'static str {
        match self {
            ParticleShape::Snowflake => "snowflake",
            ParticleShape::Circle    => "circle",
            ParticleShape::Star      => "star",
        }
    }

    pub fn next(self) -> ParticleShape {
        match self {
            ParticleShape::Snowflake => ParticleShape::Circle,
            ParticleShape::Circle    => ParticleShape::Star,
            ParticleShape::Star      => ParticleShape::Snowflake,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SpriteMask
// ════════════════════════════════════════════════════════════════════════════

/// Square coverage mask, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteMask {
    size:     usize,
    coverage: Vec<f32>,
}

impl SpriteMask {
    /// Rasterise `shape` into a `size × size` mask.
    pub fn render(shape: ParticleShape, size: usize) -> Self {
        let size = size.max(1);
        let half = size as f32 / 2.0;
        let mut coverage = vec![0.0; size * size];

        for y in 0..size {
            for x in 0..size {
                // Normalised to -1..1 from the centre of the pixel.
                let u = (x as f32 + 0.5 - half) / half;
                let v = (y as f32 + 0.5 - half) / half;
                coverage[y * size + x] = match shape {
                    ParticleShape::Circle    => disc(u, v),
                    ParticleShape::Star      => star(u, v),
                    ParticleShape::Snowflake => snowflake(u, v),
                };
            }
        }
        SpriteMask { size, coverage }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Coverage at `(x, y)`; zero outside the mask.
    pub fn at(&self, x: usize, y: usize) -> f32 {
        if x < self.size && y < self.size {
            self.coverage[y * self.size + x]
        } else {
            0.0
        }
    }

    /// Mean coverage over the whole mask.
    pub fn fill_ratio(&self) -> f32 {
        self.coverage.iter().sum::<f32>() / self.coverage.len() as f32
    }
}

// ── shape functions (u, v in -1..1) ─────────────────────────────────────────

fn disc(u: f32, v: f32) -> f32 {
    let r = (u * u + v * v).sqrt();
    // Soft one-pixel-ish edge.
    ((1.0 - r) * 6.0).clamp(0.0, 1.0)
}

fn star(u: f32, v: f32) -> f32 {
    let r = (u * u + v * v).sqrt();
    // Point up: angle measured from +y, screen y grows downward.
    let a = u.atan2(-v).rem_euclid(TAU);
    let sector = TAU / 5.0;
    let t = ((a % sector) / sector - 0.5).abs() * 2.0; // 0 at a point, 1 between
    let outer = 1.0;
    let inner = 0.45;
    let edge = outer + (inner - outer) * t;
    ((edge - r) * 6.0).clamp(0.0, 1.0)
}

fn snowflake(u: f32, v: f32) -> f32 {
    const ARM_WIDTH:    f32 = 0.09;
    const BRANCH_WIDTH: f32 = 0.07;

    let r = (u * u + v * v).sqrt();
    if r > 1.0 {
        return 0.0;
    }
    let a = v.atan2(u).rem_euclid(TAU);
    let sector = PI / 3.0;
    // Fold into one arm along the local x axis.
    let local = (a + sector / 2.0) % sector - sector / 2.0;
    let along = r * local.cos();
    let across = (r * local.sin()).abs();

    let mut hit = across < ARM_WIDTH;
    // Side branches at 40% and 70% of the arm, angled back toward the tip.
    for &(at, len) in &[(0.4, 0.3), (0.7, 0.2)] {
        let d = along - at;
        if d >= 0.0 && d < len {
            let off = (across - d).abs();
            hit |= off < BRANCH_WIDTH;
        }
    }
    // Small hub.
    hit |= r < 0.18;
    if hit { 1.0 } else { 0.0 }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
