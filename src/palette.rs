//! Analogous color palettes for the ink-bleed artwork.
//!
//! Colors live in HSL space the way the drawing surface consumes them:
//! hue in degrees, saturation and lightness in percent. A palette is an
//! ordered spread of hues around an anchor, regenerated wholesale for every
//! artwork cycle and never mutated in place.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of colors in every generated palette.
pub const NUM_COLORS: usize = 6;

/// An HSL color value: hue 0-360, saturation 0-100, lightness 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// Convert to a hex color string.
    pub fn to_hex(&self) -> String {
        // Normalize hue to 0-360
        let h = ((self.h % 360.0) + 360.0) % 360.0;
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = if h < 60.0 {
            (c, x, 0.0)
        } else if h < 120.0 {
            (x, c, 0.0)
        } else if h < 180.0 {
            (0.0, c, x)
        } else if h < 240.0 {
            (0.0, x, c)
        } else if h < 300.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        let r = ((r + m) * 255.0) as u8;
        let g = ((g + m) * 255.0) as u8;
        let b = ((b + m) * 255.0) as u8;

        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// Componentwise linear interpolation toward `other`.
    ///
    /// Hue interpolates numerically without wrapping: analogous palettes
    /// keep their spread well under a half-turn, so the short path and the
    /// numeric path coincide.
    pub fn lerp(&self, other: &Hsl, t: f64) -> Hsl {
        Hsl {
            h: self.h + (other.h - self.h) * t,
            s: self.s + (other.s - self.s) * t,
            l: self.l + (other.l - self.l) * t,
        }
    }
}

/// An ordered palette of exactly [`NUM_COLORS`] colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub colors: Vec<Hsl>,
}

impl Palette {
    /// Build an analogous palette spread around `base_hue`.
    ///
    /// Hues step evenly across `[base_hue - hue_range, base_hue + hue_range]`;
    /// saturation and lightness get a fresh random value per entry.
    pub fn analogous(base_hue: f64, hue_range: f64, rng: &mut impl Rng) -> Self {
        let step = (hue_range * 2.0) / (NUM_COLORS - 1) as f64;

        let colors = (0..NUM_COLORS)
            .map(|i| {
                let hue = (base_hue - hue_range + step * i as f64 + 360.0) % 360.0;
                Hsl::new(hue, rng.gen_range(50.0..65.0), rng.gen_range(45.0..60.0))
            })
            .collect();

        Self { colors }
    }

    /// Draw one color uniformly at random.
    pub fn pick(&self, rng: &mut impl Rng) -> Hsl {
        self.colors[rng.gen_range(0..self.colors.len())]
    }
}
