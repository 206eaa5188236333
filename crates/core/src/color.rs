//! Touch surface colors and their bulb controller representation.

use core::fmt;

use serde::{Deserialize, Serialize};

/// 32-bit color with 8 bits per channel, packed as `0xAARRGGBB`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Argb(pub u32);

impl Argb {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Creates a color from the given channels.
    pub const fn new(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self((alpha as u32) << 24 | (red as u32) << 16 | (green as u32) << 8 | blue as u32)
    }

    /// Creates an opaque color.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::new(0xFF, red, green, blue)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Interpolates between two colors in the HSV space.
    ///
    /// Every component (hue included) is interpolated linearly, the resulting color is opaque.
    #[must_use]
    pub fn lerp_hsv(self, other: Self, proportion: f32) -> Self {
        let a = Hsv::from(self);
        let b = Hsv::from(other);
        let mix = |a: f32, b: f32| a + (b - a) * proportion;

        Hsv {
            h: mix(a.h, b.h),
            s: mix(a.s, b.s),
            v: mix(a.v, b.v),
        }
        .to_argb()
    }
}

impl fmt::Debug for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

/// Color in the HSV space.
///
/// Hue is measured in degrees in `[0, 360)`, saturation and value are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    /// Converts this color back into an opaque [`Argb`] color.
    #[must_use]
    pub fn to_argb(self) -> Argb {
        let s = self.s.clamp(0.0, 1.0);
        let v = self.v.clamp(0.0, 1.0);
        let byte = |x: f32| (x * 255.0).round() as u8;

        let v_byte = byte(v);
        if s <= f32::EPSILON {
            return Argb::rgb(v_byte, v_byte, v_byte);
        }

        let hx = if self.h < 0.0 || self.h >= 360.0 {
            0.0
        } else {
            self.h / 60.0
        };
        let w = hx.floor();
        let f = hx - w;

        let p = byte((1.0 - s) * v);
        let q = byte((1.0 - s * f) * v);
        let t = byte((1.0 - s * (1.0 - f)) * v);

        match w as u8 {
            0 => Argb::rgb(v_byte, t, p),
            1 => Argb::rgb(q, v_byte, p),
            2 => Argb::rgb(p, v_byte, t),
            3 => Argb::rgb(p, q, v_byte),
            4 => Argb::rgb(t, p, v_byte),
            _ => Argb::rgb(v_byte, p, q),
        }
    }
}

impl From<Argb> for Hsv {
    fn from(color: Argb) -> Self {
        let (r, g, b) = (color.red(), color.green(), color.blue());
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);

        let v = f32::from(max) / 255.0;
        let delta = f32::from(max - min);
        if max == 0 || max == min {
            return Self { h: 0.0, s: 0.0, v };
        }

        let s = delta / f32::from(max);
        let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
        let sector = if color.red() == max {
            (g - b) / delta
        } else if color.green() == max {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };
        let mut h = sector * 60.0;
        if h < 0.0 {
            h += 360.0;
        }

        Self { h, s, v }
    }
}

/// Color in the bulb controller representation.
///
/// Red, green and blue channels are 4 bits wide, the alpha channel (brightness) is 8 bits wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BulbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl BulbColor {
    /// Maximum value of the red, green and blue channels.
    pub const CHANNEL_MAX: u8 = 15;
    /// Completely dark bulb.
    pub const BLACK: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Maps an 8-bit per channel color into the bulb representation.
    ///
    /// Color channels are scaled as `floor(c * 15 / 255)`, alpha passes through unchanged.
    pub const fn from_argb(color: Argb) -> Self {
        const fn scale(channel: u8) -> u8 {
            (channel as u16 * BulbColor::CHANNEL_MAX as u16 / 255) as u8
        }

        Self {
            r: scale(color.red()),
            g: scale(color.green()),
            b: scale(color.blue()),
            a: color.alpha(),
        }
    }

    /// Returns the color located `step / total` of the way from `self` to `other`.
    #[must_use]
    pub fn lerp(self, other: Self, step: u32, total: u32) -> Self {
        if total == 0 || step >= total {
            return other;
        }

        let mix = |a: u8, b: u8| {
            let (a, b) = (i64::from(a), i64::from(b));
            (a + (b - a) * i64::from(step) / i64::from(total)) as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

impl From<Argb> for BulbColor {
    fn from(color: Argb) -> Self {
        Self::from_argb(color)
    }
}
