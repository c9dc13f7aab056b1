//! Node placement and proximity wiring.
//!
//! Nodes are scattered by rejection sampling under a minimum-separation
//! constraint, then linked into an undirected web wherever two nodes sit
//! closer than the linking threshold. Positions use canvas-centered
//! coordinates: the origin is the middle of the square canvas.

use crate::config::ArtConfig;
use crate::palette::{Hsl, Palette};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Distance below which two nodes get connected, in base canvas units.
pub const MAX_DISTANCE: f64 = 250.0;

/// Placement attempts shared across one whole sampling run. The budget is
/// not replenished per node; crowded settings simply yield fewer nodes.
pub const MAX_ATTEMPTS: u32 = 1000;

/// Clear border kept between nodes and the canvas edge, in base units.
const EDGE_MARGIN: f64 = 100.0;

/// A placed node. Identity is its index in the generation-cycle sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Hsl,
    /// Indices of nodes within linking distance. Symmetric, no self-loops.
    pub neighbors: Vec<usize>,
    /// Reveal progress in `[0, 1]`. Only the sequencer advances this.
    pub alpha: f64,
}

impl Node {
    pub fn distance_to(&self, other: &Node) -> f64 {
        dist(self.x, self.y, other.x, other.y)
    }
}

fn dist(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// Scatter up to `num_nodes` nodes inside the margined canvas.
///
/// Each attempt draws a uniform candidate and keeps it only when it clears
/// `min_distance` from every node already placed. Exhausting the attempt
/// budget before reaching the target count is not an error.
pub fn sample_nodes(cfg: &ArtConfig, palette: &Palette, rng: &mut impl Rng) -> Vec<Node> {
    let scale = cfg.scale();
    let half = cfg.canvas.size as f64 / 2.0;
    let margin = EDGE_MARGIN * scale;
    let min_distance = cfg.layout.min_distance * scale;
    let target = cfg.layout.num_nodes;

    let mut nodes: Vec<Node> = Vec::with_capacity(target);
    let mut attempts = 0;

    while nodes.len() < target && attempts < MAX_ATTEMPTS {
        let x = rng.gen_range(-half + margin..half - margin);
        let y = rng.gen_range(-half + margin..half - margin);

        let valid = nodes.iter().all(|n| dist(x, y, n.x, n.y) >= min_distance);
        if valid {
            nodes.push(Node {
                x,
                y,
                radius: rng.gen_range(20.0..35.0) * scale,
                color: palette.pick(rng),
                neighbors: Vec::new(),
                alpha: 0.0,
            });
        }
        attempts += 1;
    }

    if nodes.len() < target {
        debug!(
            placed = nodes.len(),
            target, "placement budget exhausted before reaching target"
        );
    }

    nodes
}

/// Link every pair of nodes closer than [`MAX_DISTANCE`] (scaled).
///
/// Each unordered pair is visited once, so the neighbor lists come out
/// symmetric, self-loop free, and duplicate free.
pub fn link_neighbors(nodes: &mut [Node], scale: f64) {
    let threshold = MAX_DISTANCE * scale;

    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let d = dist(nodes[i].x, nodes[i].y, nodes[j].x, nodes[j].y);
            if d < threshold {
                nodes[i].neighbors.push(j);
                nodes[j].neighbors.push(i);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_palette(rng: &mut impl Rng) -> Palette {
        Palette::analogous(220.0, 30.0, rng)
    }

    #[test]
    fn placed_nodes_respect_minimum_separation() {
        let cfg = ArtConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let palette = test_palette(&mut rng);
        let nodes = sample_nodes(&cfg, &palette, &mut rng);

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let d = nodes[i].distance_to(&nodes[j]);
                assert!(d >= cfg.layout.min_distance, "pair ({i},{j}) at {d}");
            }
        }
    }

    #[test]
    fn reference_scenario_places_between_one_and_twelve_nodes() {
        // 12 nodes at 100px separation on an 800px canvas with the shared
        // 1000-attempt budget.
        let cfg = ArtConfig::default();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let palette = test_palette(&mut rng);
            let nodes = sample_nodes(&cfg, &palette, &mut rng);
            assert!(!nodes.is_empty());
            assert!(nodes.len() <= cfg.layout.num_nodes);
        }
    }

    #[test]
    fn nodes_stay_inside_the_margined_canvas() {
        let cfg = ArtConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let palette = test_palette(&mut rng);
        let nodes = sample_nodes(&cfg, &palette, &mut rng);

        let limit = cfg.canvas.size as f64 / 2.0 - 100.0 * cfg.scale();
        for node in &nodes {
            assert!(node.x.abs() <= limit);
            assert!(node.y.abs() <= limit);
        }
    }

    #[test]
    fn crowded_settings_degrade_to_fewer_nodes() {
        let mut cfg = ArtConfig::default();
        cfg.layout.num_nodes = 200;
        cfg.layout.min_distance = 300.0;
        let mut rng = StdRng::seed_from_u64(5);
        let palette = test_palette(&mut rng);
        let nodes = sample_nodes(&cfg, &palette, &mut rng);
        // The canvas cannot hold 200 nodes 300px apart; the sampler must
        // stop quietly at whatever fit.
        assert!(nodes.len() < 200);
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                assert!(nodes[i].distance_to(&nodes[j]) >= 300.0);
            }
        }
    }

    #[test]
    fn radii_sample_inside_fixed_band() {
        let cfg = ArtConfig::default();
        let mut rng = StdRng::seed_from_u64(17);
        let palette = test_palette(&mut rng);
        for node in sample_nodes(&cfg, &palette, &mut rng) {
            assert!(node.radius >= 20.0 && node.radius < 35.0);
        }
    }

    #[test]
    fn links_are_symmetric_and_irreflexive() {
        let cfg = ArtConfig::default();
        let mut rng = StdRng::seed_from_u64(23);
        let palette = test_palette(&mut rng);
        let mut nodes = sample_nodes(&cfg, &palette, &mut rng);
        link_neighbors(&mut nodes, cfg.scale());

        for (i, node) in nodes.iter().enumerate() {
            for &j in &node.neighbors {
                assert_ne!(i, j, "self-loop at {i}");
                assert!(nodes[j].neighbors.contains(&i), "asymmetric edge {i}-{j}");
            }
        }
    }

    #[test]
    fn links_match_the_distance_threshold_exactly() {
        let cfg = ArtConfig::default();
        let mut rng = StdRng::seed_from_u64(29);
        let palette = test_palette(&mut rng);
        let mut nodes = sample_nodes(&cfg, &palette, &mut rng);
        link_neighbors(&mut nodes, cfg.scale());

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let linked = nodes[i].neighbors.contains(&j);
                let close = nodes[i].distance_to(&nodes[j]) < MAX_DISTANCE;
                assert_eq!(linked, close, "pair ({i},{j})");
            }
        }
    }

    #[test]
    fn each_pair_contributes_at_most_one_edge() {
        let cfg = ArtConfig::default();
        let mut rng = StdRng::seed_from_u64(31);
        let palette = test_palette(&mut rng);
        let mut nodes = sample_nodes(&cfg, &palette, &mut rng);
        link_neighbors(&mut nodes, cfg.scale());

        for node in &nodes {
            let mut seen = node.neighbors.clone();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), node.neighbors.len());
        }
    }
}
