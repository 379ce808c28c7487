//! Scene props that follow the mode: the star on top of the tree and the
//! greeting sign that appears while it snows.

use glam::{Vec2, Vec3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use tinsel_field::Mode;

// ════════════════════════════════════════════════════════════════════════════
// TopStar
// ════════════════════════════════════════════════════════════════════════════

const STAR_GROW_RATE: f32 = 4.0;
const STAR_SPIN:      f32 = 0.5;
const STAR_LIFT:      f32 = 1.5;
const STAR_BOB:       f32 = 0.2;

/// Star above the tip of the tree; shrinks away when the tree scatters.
#[derive(Clone, Debug, PartialEq)]
pub struct TopStar {
    base_y:       f32,
    pub scale:    f32,
    /// Spin about the vertical axis, radians.
    pub rotation: f32,
    pub position: Vec3,
}

impl TopStar {
    pub fn new(tree_height: f32) -> Self {
        let base_y = tree_height / 2.0 + STAR_LIFT;
        TopStar { base_y, scale: 0.0, rotation: 0.0, position: Vec3::new(0.0, base_y, 0.0) }
    }

    pub fn update(&mut self, mode: Mode, time: f32, dt: f32) {
        let target = if mode == Mode::Tree { 1.0 } else { 0.0 };
        self.scale += (target - self.scale) * (STAR_GROW_RATE * dt).clamp(0.0, 1.0);
        self.rotation += dt * STAR_SPIN;
        self.position.y = self.base_y + (time * 1.5).sin() * STAR_BOB;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GreetingSign
// ════════════════════════════════════════════════════════════════════════════

pub const GREETING: &str = "MERRY CHRISTMAS";
pub const SIGN_LIGHTS: usize = 40;

const SIGN_FADE_RATE:  f32 = 2.0;
const SIGN_SCALE_RATE: f32 = 2.5;

/// One twinkling bulb around the sign.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignLight {
    /// Offset in sign-local units, `x` in -1..1, `y` in -0.5..0.5.
    pub offset: Vec2,
    pub phase:  f32,
    pub speed:  f32,
}

impl SignLight {
    /// Brightness in 0..1 at `time`.
    pub fn brightness(&self, time: f32) -> f32 {
        (time * self.speed + self.phase).sin() * 0.5 + 0.5
    }
}

/// The greeting overlay that fades in while it snows.
#[derive(Clone, Debug, PartialEq)]
pub struct GreetingSign {
    pub opacity: f32,
    pub scale:   f32,
    pub lights:  Vec<SignLight>,
}

impl GreetingSign {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed ^ 0x0051_6E);
        let lights = (0..SIGN_LIGHTS)
            .map(|_| SignLight {
                offset: Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-0.5..0.5)),
                phase:  rng.gen_range(0.0..std::f32::consts::TAU),
                speed:  rng.gen_range(2.0..5.0),
            })
            .collect();
        GreetingSign { opacity: 0.0, scale: 0.0, lights }
    }

    pub fn update(&mut self, mode: Mode, dt: f32) {
        let target = if mode == Mode::Snow { 1.0 } else { 0.0 };
        self.opacity += (target - self.opacity) * (SIGN_FADE_RATE * dt).clamp(0.0, 1.0);
        self.scale += (target - self.scale) * (SIGN_SCALE_RATE * dt).clamp(0.0, 1.0);
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.01
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
