//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              [ MERRY CHRISTMAS ]   (snow only)           │
//! │                        ★                                 │
//! │                      .:*:.        particles, additive    │
//! │                    .:*:*:*:.                             │
//! │      [card] [card] [card] [card]  gallery fan (pinch)    │
//! │                  .:*:*:*:*:*:*:.                         │
//! │  status bar                                              │
//! │  key legend                                              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Drawing goes through [`Canvas`], which owns the pixel buffer and knows
//! nothing about the window, so a whole frame can be rendered in tests.

use glam::{Mat3, Vec3};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use tinsel_field::{InstanceBuffers, Rgb};
use tinsel_mode::{GalleryItem, GestureLabel};

use crate::controls::ControlAction;
use crate::error::AppError;
use crate::gesture::pose_from_keys;
use crate::scene::{GreetingSign, TopStar, GREETING};
use crate::sprite::{ParticleShape, SpriteMask};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR:      u32 = 0xFF05_0510;
const TEXT_BG:       u32 = 0xFF0F_1A2E;
const STAR_GOLD:     u32 = 0xFFFF_D700;
const SIGN_RED:      u32 = 0xFF8B_0000;
const CARD_FRAME:    u32 = 0xFFF5_F5F5;
const STATUS_H:      usize = 36;
const MASK_SIZE:     usize = 16;

/// World-space diameter of a unit-scale particle sprite.
const PARTICLE_WORLD: f32 = 0.35;
/// Particles never shrink below this on screen unless their scale is zero.
const MIN_SPLAT_PX:   f32 = 0.6;
const PARTICLE_GLOW:  f32 = 0.85;

const STAR_WORLD: f32 = 2.4;
const CARD_W:     f32 = 3.0;
const CARD_H:     f32 = 3.6;
/// The gallery hangs in front of the scene at this offset from the HUD origin.
const GALLERY_OFFSET: Vec3 = Vec3::new(0.0, 1.0, 5.0);

// ════════════════════════════════════════════════════════════════════════════
// Camera
// ════════════════════════════════════════════════════════════════════════════

/// A point after projection to the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub x:     f32,
    pub y:     f32,
    /// Distance along the view direction.
    pub depth: f32,
    /// Pixels per world unit at this depth.
    pub scale: f32,
}

/// Pinhole perspective camera looking from `eye` toward `target`, y up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye:       Vec3,
    pub target:    Vec3,
    pub fov_y_deg: f32,
}

impl Camera {
    const NEAR: f32 = 0.1;

    /// The orbiting scene camera.
    pub fn scene() -> Self {
        Camera { eye: Vec3::new(0.0, 5.0, 45.0), target: Vec3::new(0.0, 5.0, 0.0), fov_y_deg: 60.0 }
    }

    /// Fixed camera for overlays such as the gallery.
    pub fn hud() -> Self {
        Camera { eye: Vec3::new(0.0, 0.0, 30.0), target: Vec3::ZERO, fov_y_deg: 60.0 }
    }

    pub fn project(&self, p: Vec3, width: usize, height: usize) -> Option<Projected> {
        let forward = (self.target - self.eye).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);

        let rel = p - self.eye;
        let depth = rel.dot(forward);
        if depth <= Self::NEAR {
            return None;
        }
        let focal = (height as f32 / 2.0) / (self.fov_y_deg.to_radians() / 2.0).tan();
        let scale = focal / depth;
        Some(Projected {
            x: width as f32 / 2.0 + rel.dot(right) * scale,
            y: height as f32 / 2.0 - rel.dot(up) * scale,
            depth,
            scale,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame: everything one render needs
// ════════════════════════════════════════════════════════════════════════════

/// Read-only snapshot of the scene handed to the renderer each frame.
pub struct Frame<'a> {
    pub instances: &'a InstanceBuffers,
    /// Orbit angle of the scene camera about the y axis.
    pub yaw:       f32,
    pub time:      f32,
    pub shape:     ParticleShape,
    pub star:      &'a TopStar,
    pub sign:      &'a GreetingSign,
    pub gallery:   &'a [GalleryItem],
    pub status:    &'a str,
}

/// Input gathered from the window for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputFrame {
    /// Simulated hand pose from the held keys.
    pub hand:    Option<GestureLabel>,
    pub actions: Vec<ControlAction>,
}

pub const KEY_LEGEND: &str =
    "HOLD O=PALM F=FIST P=PINCH X=OTHER | M=MODE G=FEED C=COLOUR S=SHAPE +/-=SIZE A=ADD PHOTO BKSP=CLEAR Q=QUIT";

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
    masks:  SpriteMasks,
}

impl Visualizer {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, AppError> {
        let mut window = Window::new(
            title,
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: Canvas::new(width, height),
            masks: SpriteMasks::new(MASK_SIZE),
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll the keyboard: held pose keys plus one-shot control keys.
    pub fn poll_input(&self) -> InputFrame {
        let down     = |k: Key| self.window.is_key_down(k);
        // Keys that trigger on first press only
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        // Keys that repeat while held
        let held     = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        let hand = pose_from_keys(down(Key::O), down(Key::F), down(Key::P), down(Key::X));

        let mut actions = Vec::new();
        if one_shot(Key::Q) || one_shot(Key::Escape) { actions.push(ControlAction::Quit); }
        if one_shot(Key::M)                          { actions.push(ControlAction::ToggleMode); }
        if one_shot(Key::G)                          { actions.push(ControlAction::ToggleFeed); }
        if one_shot(Key::C)                          { actions.push(ControlAction::NextColor); }
        if one_shot(Key::S)                          { actions.push(ControlAction::NextShape); }
        if one_shot(Key::A)                          { actions.push(ControlAction::AddPhoto); }
        if one_shot(Key::Backspace)                  { actions.push(ControlAction::ClearPhotos); }
        if held(Key::Up) || held(Key::Equal)         { actions.push(ControlAction::Grow); }
        if held(Key::Down) || held(Key::Minus)       { actions.push(ControlAction::Shrink); }

        InputFrame { hand, actions }
    }

    /// Render one frame and present it.
    pub fn render(&mut self, frame: &Frame<'_>) -> Result<(), AppError> {
        draw_frame(&mut self.canvas, &self.masks, frame);
        self.window
            .update_with_buffer(&self.canvas.buf, self.canvas.width, self.canvas.height)?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame composition
// ════════════════════════════════════════════════════════════════════════════

/// One pre-rendered mask per particle shape, plus the star.
pub struct SpriteMasks {
    snowflake: SpriteMask,
    circle:    SpriteMask,
    star:      SpriteMask,
}

impl SpriteMasks {
    pub fn new(size: usize) -> Self {
        SpriteMasks {
            snowflake: SpriteMask::render(ParticleShape::Snowflake, size),
            circle:    SpriteMask::render(ParticleShape::Circle, size),
            star:      SpriteMask::render(ParticleShape::Star, size * 2),
        }
    }

    pub fn for_shape(&self, shape: ParticleShape) -> &SpriteMask {
        match shape {
            ParticleShape::Snowflake => &self.snowflake,
            ParticleShape::Circle    => &self.circle,
            ParticleShape::Star      => &self.star,
        }
    }
}

/// Draw everything in `frame` into `canvas`.
pub fn draw_frame(canvas: &mut Canvas, masks: &SpriteMasks, frame: &Frame<'_>) {
    canvas.clear(BG_COLOR);
    let (w, h) = (canvas.width, canvas.height.saturating_sub(STATUS_H));

    // ── Particles ─────────────────────────────────────────────────────────
    let camera = Camera::scene();
    let orbit = Mat3::from_rotation_y(frame.yaw);
    let mask = masks.for_shape(frame.shape);
    for inst in frame.instances.iter() {
        if inst.scale <= 0.0 { continue; }
        let Some(p) = camera.project(orbit * inst.position, w, h) else { continue };
        let radius = (inst.scale * PARTICLE_WORLD * p.scale / 2.0).max(MIN_SPLAT_PX);
        canvas.splat_add(mask, p.x, p.y, radius, 1.0, inst.color, PARTICLE_GLOW);
    }

    // ── Top star ──────────────────────────────────────────────────────────
    if frame.star.scale > 1e-3 {
        if let Some(p) = camera.project(orbit * frame.star.position, w, h) {
            let radius = frame.star.scale * STAR_WORLD * p.scale / 2.0;
            let squash = frame.star.rotation.cos().abs().max(0.2);
            canvas.splat_over(&masks.star, p.x, p.y, radius, squash, STAR_GOLD, 1.0);
        }
    }

    // ── Greeting sign ─────────────────────────────────────────────────────
    if frame.sign.is_visible() {
        draw_sign(canvas, frame.sign, frame.time);
    }

    // ── Gallery fan ───────────────────────────────────────────────────────
    let hud = Camera::hud();
    for item in frame.gallery.iter().filter(|i| i.is_visible()) {
        let Some(p) = hud.project(item.render_position + GALLERY_OFFSET, w, h) else { continue };
        let s = item.reveal_progress;
        draw_card(
            canvas,
            p.x, p.y,
            CARD_W * p.scale * s / 2.0,
            CARD_H * p.scale * s / 2.0,
            item.fan_rotation_z,
            photo_tint(&item.photo_id),
            s,
        );
    }

    // ── Status bar ────────────────────────────────────────────────────────
    let sy = canvas.height.saturating_sub(STATUS_H);
    canvas.fill_rect(0, sy, canvas.width, STATUS_H, TEXT_BG);
    canvas.draw_label(frame.status, 10, sy + 8, 1, 0xFFEEEEEE);

    // ── Key legend ────────────────────────────────────────────────────────
    canvas.draw_label(KEY_LEGEND, 10, canvas.height.saturating_sub(12), 1, 0xFF888888);
}

fn draw_sign(canvas: &mut Canvas, sign: &GreetingSign, time: f32) {
    let text_scale = ((4.0 * sign.scale).round() as usize).max(1);
    let text_w = GREETING.chars().count() * 4 * text_scale;
    let text_h = 5 * text_scale;
    let pad = 4 * text_scale;
    let box_w = text_w + pad * 2;
    let box_h = text_h + pad * 2;
    let x0 = canvas.width.saturating_sub(box_w) / 2;
    let y0 = canvas.height / 10;

    canvas.blend_rect(x0, y0, box_w, box_h, SIGN_RED, sign.opacity * 0.7);
    let text = blend(BG_COLOR, STAR_GOLD, sign.opacity);
    canvas.draw_label(GREETING, x0 + pad, y0 + pad, text_scale, text);

    let cx = x0 as f32 + box_w as f32 / 2.0;
    let cy = y0 as f32 + box_h as f32 / 2.0;
    for light in &sign.lights {
        let lx = cx + light.offset.x * box_w as f32 / 2.0;
        let ly = cy + light.offset.y * box_h as f32;
        let glow = light.brightness(time) * sign.opacity;
        canvas.splat_disc_add(lx, ly, 1.5 * text_scale as f32 / 2.0, Rgb::from_u8(0xFF, 0xE0, 0x80), glow);
    }
}

fn draw_card(
    canvas: &mut Canvas,
    cx: f32, cy: f32,
    half_w: f32, half_h: f32,
    rotation: f32,
    tint: u32,
    alpha: f32,
) {
    let border = half_w * 0.08;
    canvas.fill_rotated(cx, cy, half_w, half_h, rotation, alpha, |lx, ly| {
        // Polaroid: wider margin at the bottom.
        let inner = lx.abs() <= half_w - border
            && ly <= half_h - border
            && ly >= -half_h + border * 3.5;
        if inner { tint } else { CARD_FRAME }
    });
}

/// Stable colour for a photo identifier.
fn photo_tint(id: &str) -> u32 {
    // FNV-1a
    let mut h: u32 = 0x811C_9DC5;
    for b in id.bytes() {
        h ^= b as u32;
        h = h.wrapping_mul(0x0100_0193);
    }
    Rgb::from_hsl((h % 360) as f32 / 360.0, 0.45, 0.55).to_argb()
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

/// An ARGB pixel buffer with the drawing primitives the visualizer needs.
pub struct Canvas {
    width:  usize,
    height: usize,
    buf:    Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { width, height, buf: vec![BG_COLOR; width * height] }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    pub fn clear(&mut self, color: u32) {
        self.buf.fill(color);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(self.height) {
            for col in x..(x+w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    fn blend_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32, alpha: f32) {
        for row in y..(y+h).min(self.height) {
            for col in x..(x+w).min(self.width) {
                let i = row * self.width + col;
                self.buf[i] = blend(self.buf[i], color, alpha);
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.buf[y * self.width + x] = color;
        }
    }

    fn add_pixel(&mut self, x: isize, y: isize, color: Rgb, amount: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let i = y as usize * self.width + x as usize;
        self.buf[i] = add(self.buf[i], color, amount);
    }

    fn blend_pixel(&mut self, x: isize, y: isize, color: u32, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let i = y as usize * self.width + x as usize;
        self.buf[i] = blend(self.buf[i], color, alpha);
    }

    /// Screen-space bounding box of a square of half-size `rx × ry` at
    /// `(cx, cy)`, clipped to the canvas.
    fn bounds(&self, cx: f32, cy: f32, rx: f32, ry: f32) -> Option<(isize, isize, isize, isize)> {
        let x0 = ((cx - rx).floor() as isize).max(0);
        let y0 = ((cy - ry).floor() as isize).max(0);
        let x1 = ((cx + rx).ceil() as isize).min(self.width as isize - 1);
        let y1 = ((cy + ry).ceil() as isize).min(self.height as isize - 1);
        (x0 <= x1 && y0 <= y1).then_some((x0, y0, x1, y1))
    }

    /// Additively splat `mask` centred at `(cx, cy)`.
    ///
    /// `squash` narrows the sprite horizontally (1 = square).
    fn splat_add(&mut self, mask: &SpriteMask, cx: f32, cy: f32, radius: f32, squash: f32, color: Rgb, gain: f32) {
        if radius < 1.0 {
            // Sub-pixel sprite: a single dimmed dot.
            self.add_pixel(cx as isize, cy as isize, color, gain * radius);
            return;
        }
        let rx = radius * squash;
        let Some((x0, y0, x1, y1)) = self.bounds(cx, cy, rx, radius) else { return };
        let n = mask.size() as f32;
        for y in y0..=y1 {
            let v = ((y as f32 + 0.5 - (cy - radius)) / (2.0 * radius) * n) as isize;
            if v < 0 { continue; }
            for x in x0..=x1 {
                let u = ((x as f32 + 0.5 - (cx - rx)) / (2.0 * rx) * n) as isize;
                if u < 0 { continue; }
                let c = mask.at(u as usize, v as usize);
                if c > 0.0 {
                    self.add_pixel(x, y, color, c * gain);
                }
            }
        }
    }

    /// Alpha-composite `mask` in a solid colour.
    fn splat_over(&mut self, mask: &SpriteMask, cx: f32, cy: f32, radius: f32, squash: f32, color: u32, alpha: f32) {
        let rx = radius * squash;
        if rx < 0.5 { return; }
        let Some((x0, y0, x1, y1)) = self.bounds(cx, cy, rx, radius) else { return };
        let n = mask.size() as f32;
        for y in y0..=y1 {
            let v = ((y as f32 + 0.5 - (cy - radius)) / (2.0 * radius) * n) as isize;
            if v < 0 { continue; }
            for x in x0..=x1 {
                let u = ((x as f32 + 0.5 - (cx - rx)) / (2.0 * rx) * n) as isize;
                if u < 0 { continue; }
                let c = mask.at(u as usize, v as usize);
                if c > 0.0 {
                    self.blend_pixel(x, y, color, c * alpha);
                }
            }
        }
    }

    /// Additive soft dot without a mask.
    fn splat_disc_add(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb, gain: f32) {
        let r = radius.max(0.5);
        let Some((x0, y0, x1, y1)) = self.bounds(cx, cy, r, r) else { return };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let falloff = 1.0 - (dx * dx + dy * dy).sqrt() / r;
                if falloff > 0.0 {
                    self.add_pixel(x, y, color, falloff * gain);
                }
            }
        }
    }

    /// Fill a rectangle rotated by `angle` (counter-clockwise, y up).
    ///
    /// `shade` maps a point in the rectangle's local frame (y up) to its
    /// colour.
    fn fill_rotated<F>(&mut self, cx: f32, cy: f32, half_w: f32, half_h: f32, angle: f32, alpha: f32, shade: F)
    where
        F: Fn(f32, f32) -> u32,
    {
        if half_w <= 0.0 || half_h <= 0.0 { return; }
        let reach = (half_w * half_w + half_h * half_h).sqrt();
        let Some((x0, y0, x1, y1)) = self.bounds(cx, cy, reach, reach) else { return };
        let (sin, cos) = angle.sin_cos();
        for y in y0..=y1 {
            let dy = cy - (y as f32 + 0.5);
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let lx =  dx * cos + dy * sin;
                let ly = -dx * sin + dy * cos;
                if lx.abs() <= half_w && ly.abs() <= half_h {
                    self.blend_pixel(x, y, shade(lx, ly), alpha);
                }
            }
        }
    }

    /// Minimal bitmap font: 3×5 characters, each pixel drawn `scale × scale`.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let s = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            if cx + 4 * s > self.width { break; }
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        for py in 0..s {
                            for px in 0..s {
                                self.set_pixel(cx + col * s + px, y + row * s + py, color);
                            }
                        }
                    }
                }
            }
            cx += 4 * s; // 3 wide + 1 gap
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

/// Saturating additive blend of `color · amount` onto ARGB `dst`.
fn add(dst: u32, color: Rgb, amount: f32) -> u32 {
    let amount = amount.max(0.0);
    let [r, g, b] = color.to_u8();
    let ch = |d: u32, c: u8| (d as f32 + c as f32 * amount).min(255.0) as u32;
    let dr = (dst >> 16) & 0xFF;
    let dg = (dst >>  8) & 0xFF;
    let db =  dst        & 0xFF;
    0xFF000000 | (ch(dr, r) << 16) | (ch(dg, g) << 8) | ch(db, b)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use tinsel_field::{palette, FieldParams, FrameInputs, Mode, ParticleAnimator, ParticleField};
    use tinsel_mode::GalleryFan;

    const W: usize = 320;
    const H: usize = 240;

    // ── camera ───────────────────────────────────────────────────────────
    #[test]
    fn target_projects_to_centre() {
        let cam = Camera::scene();
        let p = cam.project(cam.target, W, H).unwrap();
        assert!((p.x - W as f32 / 2.0).abs() < 1e-3);
        assert!((p.y - H as f32 / 2.0).abs() < 1e-3);
        assert!((p.depth - 45.0).abs() < 1e-3);
    }

    #[test]
    fn screen_axes_point_right_and_up() {
        let cam = Camera::hud();
        let right = cam.project(Vec3::new(1.0, 0.0, 0.0), W, H).unwrap();
        let up = cam.project(Vec3::new(0.0, 1.0, 0.0), W, H).unwrap();
        assert!(right.x > W as f32 / 2.0);
        assert!(up.y < H as f32 / 2.0);
    }

    #[test]
    fn farther_is_smaller_and_behind_is_culled() {
        let cam = Camera::hud();
        let near = cam.project(Vec3::new(0.0, 0.0, 10.0), W, H).unwrap();
        let far = cam.project(Vec3::new(0.0, 0.0, -10.0), W, H).unwrap();
        assert!(near.scale > far.scale);
        assert!(cam.project(Vec3::new(0.0, 0.0, 31.0), W, H).is_none());
    }

    #[test]
    fn fov_matches_visible_height() {
        // At depth d the visible half-height is d·tan(30°).
        let cam = Camera::hud();
        let edge = 30.0 * 30f32.to_radians().tan();
        let p = cam.project(Vec3::new(0.0, edge, 0.0), W, H).unwrap();
        assert!(p.y.abs() < 1e-2);
    }

    // ── colour maths ─────────────────────────────────────────────────────
    #[test]
    fn additive_saturates() {
        let white = add(0xFF80_8080, palette::SOCK_WHITE, 1.0);
        assert_eq!(white, 0xFFFF_FFFF);
        assert_eq!(add(0xFF10_2030, palette::SOCK_WHITE, 0.0), 0xFF10_2030);
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }

    #[test]
    fn photo_tints_are_stable() {
        assert_eq!(photo_tint("photo-1"), photo_tint("photo-1"));
        assert_ne!(photo_tint("photo-1"), photo_tint("photo-2"));
    }

    // ── canvas primitives ────────────────────────────────────────────────
    #[test]
    fn legend_and_status_use_real_glyphs() {
        let fallback = char_glyph('\u{1}');
        for ch in KEY_LEGEND.chars().chain("MODE: TREE GALLERY: OPEN GESTURE: OPEN_PALM".chars()) {
            if ch != ' ' {
                assert_ne!(char_glyph(ch), fallback, "missing glyph {ch:?}");
            }
        }
    }

    #[test]
    fn labels_clip_at_right_edge() {
        let mut c = Canvas::new(20, 10);
        c.draw_label("MMMMMMMMMM", 0, 0, 1, 0xFFFFFFFF);
        c.draw_label("M", 18, 0, 3, 0xFFFFFFFF);
    }

    #[test]
    fn splats_clip_at_every_edge() {
        let mut c = Canvas::new(16, 16);
        let mask = SpriteMask::render(ParticleShape::Circle, 8);
        for &(x, y) in &[(-5.0, -5.0), (20.0, 8.0), (8.0, 20.0), (0.0, 15.9)] {
            c.splat_add(&mask, x, y, 6.0, 1.0, palette::SOCK_WHITE, 1.0);
            c.splat_over(&mask, x, y, 6.0, 0.5, STAR_GOLD, 1.0);
        }
        c.splat_add(&mask, 8.0, 8.0, 4.0, 1.0, palette::SOCK_WHITE, 1.0);
        assert_ne!(c.pixel(8, 8), Some(BG_COLOR));
    }

    #[test]
    fn rotated_rect_covers_its_centre_only() {
        let mut c = Canvas::new(64, 64);
        c.fill_rotated(32.0, 32.0, 10.0, 4.0, std::f32::consts::FRAC_PI_2, 1.0, |_, _| 0xFFFFFFFF);
        assert_eq!(c.pixel(32, 32), Some(0xFFFFFFFF));
        // Rotated a quarter turn: tall, not wide.
        assert_eq!(c.pixel(32, 24), Some(0xFFFFFFFF));
        assert_eq!(c.pixel(40, 32), Some(BG_COLOR));
    }

    // ── whole frame ──────────────────────────────────────────────────────
    #[test]
    fn full_frame_renders_particles_and_cards() {
        let params = FieldParams { particle_count: 400, ..FieldParams::default() };
        let mut field = ParticleField::generate(&params, 3);
        let mut animator = ParticleAnimator::new(&params, 3);
        let mut out = InstanceBuffers::default();
        let inputs = FrameInputs { mode: Mode::Tree, user_color: palette::TREE_GREEN, size_scale: 5.0, time: 0.0 };
        animator.step(&mut field, &inputs, &mut out);

        let mut fan = GalleryFan::default();
        fan.sync_photos(&["photo-1".to_string(), "photo-2".to_string()]);
        fan.update(true, std::time::Duration::ZERO, 0.0, 1.0);

        let mut star = TopStar::new(params.height);
        star.update(Mode::Tree, 0.0, 1.0);
        let sign = GreetingSign::new(3);

        let frame = Frame {
            instances: &out,
            yaw:       0.0,
            time:      0.0,
            shape:     ParticleShape::Snowflake,
            star:      &star,
            sign:      &sign,
            gallery:   fan.items(),
            status:    "MODE: TREE",
        };
        let mut canvas = Canvas::new(W, H);
        draw_frame(&mut canvas, &SpriteMasks::new(8), &frame);

        let lit = canvas.buf.iter().filter(|&&p| p != BG_COLOR).count();
        assert!(lit > 500, "only {lit} pixels drawn");
        // First card is fully revealed and centred-left in the HUD.
        assert!(canvas.buf.contains(&CARD_FRAME));
    }
}
