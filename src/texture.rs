//! Backdrop composition and caching.
//!
//! The backdrop complements the palette's anchor hue and is composed once,
//! then stamped under every frame as a cached layer. Recomposition happens
//! only when the anchor hue changes between cycles.

use crate::config::ArtConfig;
use crate::palette::Hsl;
use crate::surface::{BezierStroke, Layer, Surface, SvgSurface};
use rand::Rng;
use tracing::debug;

/// The two observed backdrop treatments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureStyle {
    /// Flat complementary wash under a single translucent veil.
    Wash,
    /// Dense curved-stroke bands over the wash, thousands per band.
    Layered,
}

struct Cached {
    key: u64,
    layer: Layer,
}

/// Owns the lazily-computed backdrop layer for a session.
pub struct Backdrop {
    style: TextureStyle,
    cached: Option<Cached>,
}

impl Backdrop {
    pub fn new(style: TextureStyle) -> Self {
        Self {
            style,
            cached: None,
        }
    }

    pub fn style(&self) -> TextureStyle {
        self.style
    }

    /// Return the backdrop for the configured hue, composing it first if the
    /// cache is empty or keyed to a different hue.
    pub fn ensure(&mut self, cfg: &ArtConfig, rng: &mut impl Rng) -> &Layer {
        let key = cfg.palette.base_hue.to_bits();

        let cached = match self.cached.take() {
            Some(c) if c.key == key => c,
            _ => {
                debug!(base_hue = cfg.palette.base_hue, "composing backdrop");
                Cached {
                    key,
                    layer: compose(cfg, self.style, rng),
                }
            }
        };

        &self.cached.insert(cached).layer
    }
}

fn compose(cfg: &ArtConfig, style: TextureStyle, rng: &mut impl Rng) -> Layer {
    let size = cfg.canvas.size;
    let scale = cfg.scale();
    let base_hue = cfg.palette.base_hue;
    let bg_hue = (base_hue + 180.0) % 360.0;

    let mut surface = SvgSurface::new(size, size);
    surface.background(Hsl::new(bg_hue, 10.0, 95.0));

    match style {
        TextureStyle::Wash => {
            // One barely-there veil over the wash.
            let half = size as f64 / 2.0;
            surface.fill_rect(
                -half,
                -half,
                size as f64,
                size as f64,
                Hsl::new(bg_hue, 20.0, 99.0),
                8.0,
            );
        }
        TextureStyle::Layered => {
            stroke_band(
                &mut surface,
                20_000,
                0.15 * scale,
                Hsl::new(base_hue, 20.0, 99.0),
                8.0,
                800.0 * scale,
                rng,
            );
            stroke_band(
                &mut surface,
                8_000,
                0.2 * scale,
                Hsl::new((base_hue + 15.0) % 360.0, 25.0, 95.0),
                12.0,
                600.0 * scale,
                rng,
            );
            stroke_band(
                &mut surface,
                4_000,
                0.25 * scale,
                Hsl::new((base_hue - 15.0 + 360.0) % 360.0, 30.0, 90.0),
                15.0,
                400.0 * scale,
                rng,
            );
        }
    }

    Layer::from_frame(&surface.frame())
}

/// Scatter `count` random cubic strokes across the padded canvas.
///
/// Control points may land outside the canvas so curves sweep through the
/// edges instead of dying on them. Color channels jitter per stroke.
pub fn stroke_band(
    surface: &mut impl Surface,
    count: usize,
    weight: f64,
    color: Hsl,
    opacity: f64,
    pad: f64,
    rng: &mut impl Rng,
) {
    let w = surface.width() as f64;
    let h = surface.height() as f64;

    for _ in 0..count {
        let mut point = || {
            (
                rng.gen_range(-pad..w + pad) - w / 2.0,
                rng.gen_range(-pad..h + pad) - h / 2.0,
            )
        };
        let points = [point(), point(), point(), point()];

        surface.bezier(&BezierStroke {
            points,
            color: Hsl::new(
                color.h + rng.gen_range(-10.0..10.0),
                color.s + rng.gen_range(-5.0..5.0),
                color.l + rng.gen_range(-10.0..10.0),
            ),
            opacity,
            weight,
        });
    }
}

/// The faint stroke pass laid over the finished flat composition.
pub fn atmospheric_pass(surface: &mut impl Surface, cfg: &ArtConfig, rng: &mut impl Rng) {
    let scale = cfg.scale();
    stroke_band(
        surface,
        2_000,
        0.15 * scale,
        Hsl::new(cfg.palette.base_hue, 20.0, 90.0),
        5.0,
        400.0 * scale,
        rng,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn wash_backdrop_is_cached_per_hue() {
        let cfg = ArtConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut backdrop = Backdrop::new(TextureStyle::Wash);

        let first = backdrop.ensure(&cfg, &mut rng).svg.clone();
        let second = backdrop.ensure(&cfg, &mut rng).svg.clone();
        assert_eq!(first, second);
    }

    #[test]
    fn hue_change_invalidates_the_cache() {
        let mut cfg = ArtConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut backdrop = Backdrop::new(TextureStyle::Wash);

        let first = backdrop.ensure(&cfg, &mut rng).svg.clone();
        cfg.palette.base_hue = 40.0;
        let second = backdrop.ensure(&cfg, &mut rng).svg.clone();
        assert_ne!(first, second);
    }

    #[test]
    fn layered_backdrop_carries_stroke_bands() {
        let cfg = ArtConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut backdrop = Backdrop::new(TextureStyle::Layered);

        let layer = backdrop.ensure(&cfg, &mut rng);
        let paths = layer.svg.matches("<path").count();
        assert_eq!(paths, 32_000);
    }

    #[test]
    fn wash_complements_the_anchor_hue() {
        let cfg = ArtConfig::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut backdrop = Backdrop::new(TextureStyle::Wash);

        // base hue 220 complements to 40; the wash color is hsl(40, 10, 95).
        let expected = Hsl::new(40.0, 10.0, 95.0).to_hex();
        let layer = backdrop.ensure(&cfg, &mut rng);
        assert!(layer.svg.contains(&expected));
    }
}
