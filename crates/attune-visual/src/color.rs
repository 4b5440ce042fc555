//! Colors and the shared palette

use attune_core::{AttuneError, AttuneResult};

/// Color in RGBA (0.0 - 1.0 range)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// From 8-bit channels
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    pub fn gray(level: f32) -> Self {
        Self::new(level, level, level)
    }

    pub fn with_alpha(mut self, a: f32) -> Self {
        self.a = a.clamp(0.0, 1.0);
        self
    }

    /// Parse `#RRGGBB`
    pub fn from_hex(hex: &str) -> AttuneResult<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(AttuneError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| AttuneError::InvalidColor(hex.to_string()))
        };
        Ok(Self::rgb8(channel(0)?, channel(2)?, channel(4)?))
    }

    /// From hue (degrees, wraps), saturation and brightness (0.0 - 1.0)
    pub fn from_hsb(hue: f32, saturation: f32, brightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let v = brightness.clamp(0.0, 1.0);

        let c = v * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = v - c;
        Self::new(r + m, g + m, b + m)
    }

    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// 8-bit channels, alpha last
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// Named colors shared by the characters
pub mod palette {
    use super::Color;

    pub fn sky_top() -> Color {
        Color::rgb8(0xFF, 0xE3, 0xB3)
    }

    pub fn sky_bottom() -> Color {
        Color::rgb8(0xFF, 0xB7, 0xA5)
    }

    pub fn wood_base() -> Color {
        Color::rgb8(0xA0, 0x52, 0x2D)
    }

    pub fn wood_tip() -> Color {
        Color::rgb8(0x8B, 0x45, 0x13)
    }

    /// Leaves and progress bar while growing
    pub fn calm() -> Color {
        Color::rgb8(0xFF, 0x8C, 0x00)
    }

    /// Progress bar after growing
    pub fn alarm() -> Color {
        Color::rgb8(0xB2, 0x22, 0x22)
    }

    /// Wilted leaves
    pub fn dead() -> Color {
        wood_tip()
    }

    pub fn nose_marker() -> Color {
        Color::new(1.0, 0.0, 0.0)
    }
}
