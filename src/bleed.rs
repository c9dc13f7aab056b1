//! Ink-bleed draw operations for nodes and connections.
//!
//! Every draw re-samples its jitter, so repeated draws of the same node
//! accumulate into an organic, uneven wash rather than a crisp disc.

use crate::config::ArtConfig;
use crate::layout::Node;
use crate::palette::Hsl;
use crate::surface::{BleedStroke, Surface};
use rand::Rng;

/// Tuning for one blob draw.
#[derive(Debug, Clone, Copy)]
pub struct BlobStyle {
    /// Overlapping passes per draw.
    pub passes: usize,
    /// Extra radius multiplier (the highlight pass shrinks to 0.7).
    pub radius_scale: f64,
    /// Sampling range for the edge-diffusion parameter.
    pub edge: (f64, f64),
}

impl BlobStyle {
    /// Single pass per tick, as drawn while a node animates in.
    pub fn animated() -> Self {
        Self {
            passes: 1,
            radius_scale: 1.0,
            edge: (0.4, 0.6),
        }
    }

    /// Three overlapping passes, as drawn by the flat composition.
    pub fn flat(radius_scale: f64) -> Self {
        Self {
            passes: 3,
            radius_scale,
            edge: (0.35, 0.55),
        }
    }
}

/// Draw one node's blob at the given reveal alpha.
pub fn node_bleed(
    surface: &mut impl Surface,
    node: &Node,
    alpha: f64,
    style: &BlobStyle,
    cfg: &ArtConfig,
    rng: &mut impl Rng,
) {
    let scale = cfg.scale();
    let blob_size = cfg.brush.blob_size;

    for _ in 0..style.passes {
        let color = Hsl::new(
            node.color.h,
            node.color.s * rng.gen_range(0.3..0.5),
            node.color.l * rng.gen_range(0.7..1.0),
        );

        let offset_x = rng.gen_range(-3.0..3.0) * scale * blob_size;
        let offset_y = rng.gen_range(-3.0..3.0) * scale * blob_size;
        let radius = node.radius * style.radius_scale * rng.gen_range(0.9..1.1) * blob_size;

        surface.bleed_circle(&BleedStroke {
            x: node.x + offset_x,
            y: node.y + offset_y,
            radius,
            color,
            opacity: alpha * rng.gen_range(85.0..95.0),
            bleed: rng.gen_range(style.edge.0..style.edge.1),
            texture: (rng.gen_range(0.4..0.7), rng.gen_range(0.4..0.7)),
        });
    }
}

/// Draw the blended bleed marking the connection between two nodes.
///
/// The bleed sits at a random fraction of the segment between the two
/// centers and mixes their colors at an independent random fraction.
pub fn connection_bleed(
    surface: &mut impl Surface,
    a: &Node,
    b: &Node,
    size: (f64, f64),
    cfg: &ArtConfig,
    rng: &mut impl Rng,
) {
    let scale = cfg.scale();
    let blob_size = cfg.brush.blob_size;

    let t = rng.gen_range(0.4..0.6);
    let mx = a.x + (b.x - a.x) * t;
    let my = a.y + (b.y - a.y) * t;

    let color = a.color.lerp(&b.color, rng.gen_range(0.4..0.6));

    surface.bleed_circle(&BleedStroke {
        x: mx,
        y: my,
        radius: rng.gen_range(size.0..size.1) * scale * blob_size,
        color,
        opacity: rng.gen_range(70.0..85.0),
        bleed: rng.gen_range(0.4..0.6),
        texture: (rng.gen_range(0.5..0.8), rng.gen_range(0.4..0.7)),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SvgSurface;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn node(x: f64, y: f64) -> Node {
        Node {
            x,
            y,
            radius: 25.0,
            color: Hsl::new(220.0, 60.0, 50.0),
            neighbors: vec![],
            alpha: 0.0,
        }
    }

    #[test]
    fn flat_style_draws_three_passes() {
        let cfg = ArtConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut surface = SvgSurface::new(800, 800);

        node_bleed(
            &mut surface,
            &node(0.0, 0.0),
            1.0,
            &BlobStyle::flat(1.0),
            &cfg,
            &mut rng,
        );
        assert_eq!(surface.frame().svg.matches("<circle").count(), 3);
    }

    #[test]
    fn zero_alpha_draws_fully_transparent() {
        let cfg = ArtConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut surface = SvgSurface::new(800, 800);

        node_bleed(
            &mut surface,
            &node(0.0, 0.0),
            0.0,
            &BlobStyle::animated(),
            &cfg,
            &mut rng,
        );
        assert!(surface.frame().svg.contains(r#"opacity="0.000""#));
    }

    #[test]
    fn connection_bleed_lands_between_the_nodes() {
        let cfg = ArtConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut surface = SvgSurface::new(800, 800);

        // Vertical segment: the bleed's x stays at the shared x and y falls
        // strictly between the endpoints for any t in (0.4, 0.6).
        connection_bleed(
            &mut surface,
            &node(50.0, -100.0),
            &node(50.0, 100.0),
            (10.0, 15.0),
            &cfg,
            &mut rng,
        );
        let svg = surface.frame().svg;
        assert!(svg.contains(r#"cx="50.0""#));
    }
}
