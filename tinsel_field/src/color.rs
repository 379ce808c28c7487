//! Linear RGB colours, `#rrggbb` parsing, and the HSL lightness nudge used
//! to vary the needle green.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from [`Rgb::from_hex`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("expected 6 hex digits, got {0:?}")]
    Length(String),
    #[error("invalid hex digits in {0:?}")]
    Digits(String),
}

/// An RGB colour with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Rgb { r, g, b }
    }

    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Rgb {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return Err(ColorParseError::Length(s.to_string()));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digits(s.to_string()));
        }
        let v = u32::from_str_radix(hex, 16).map_err(|_| ColorParseError::Digits(s.to_string()))?;
        Ok(Rgb::from_u8((v >> 16) as u8, (v >> 8) as u8, v as u8))
    }

    /// `#rrggbb`, lower case.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_u8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn to_u8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Packed `0xAARRGGBB` with opaque alpha, the layout framebuffers use.
    pub fn to_argb(self) -> u32 {
        let [r, g, b] = self.to_u8();
        0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }

    /// Hue, saturation, lightness, each in `0.0..=1.0`.
    pub fn to_hsl(self) -> (f32, f32, f32) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let l = (max + min) / 2.0;
        if max == min {
            return (0.0, 0.0, l);
        }
        let d = max - min;
        let s = if l <= 0.5 { d / (max + min) } else { d / (2.0 - max - min) };
        let h = if max == self.r {
            (self.g - self.b) / d + if self.g < self.b { 6.0 } else { 0.0 }
        } else if max == self.g {
            (self.b - self.r) / d + 2.0
        } else {
            (self.r - self.g) / d + 4.0
        };
        (h / 6.0, s, l)
    }

    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        if s == 0.0 {
            return Rgb::new(l, l, l);
        }
        let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Rgb::new(
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    }

    /// Shift lightness by `delta`, keeping hue and saturation.
    pub fn offset_lightness(self, delta: f32) -> Self {
        let (h, s, l) = self.to_hsl();
        Rgb::from_hsl(h, s, l + delta)
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Fixed scene colours.
pub mod palette {
    use super::Rgb;

    macro_rules! hex {
        ($r:expr, $g:expr, $b:expr) => {
            Rgb::new($r as f32 / 255.0, $g as f32 / 255.0, $b as f32 / 255.0)
        };
    }

    pub const TREE_GREEN:    Rgb = hex!(0x90, 0xEE, 0x90);
    pub const RIBBON_SILVER: Rgb = hex!(0xE0, 0xE0, 0xE0);
    pub const BELL_GOLD:     Rgb = hex!(0xFF, 0xD7, 0x00);
    pub const SOCK_RED:      Rgb = hex!(0xFF, 0x45, 0x00);
    pub const SOCK_WHITE:    Rgb = hex!(0xFF, 0xFF, 0xFF);
    pub const SNOW_WHITE:    Rgb = hex!(0xF0, 0xF8, 0xFF);
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
