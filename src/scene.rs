//! One generation cycle's product: a palette plus placed, linked nodes.
//!
//! A scene is rebuilt from scratch on every regeneration request; nothing
//! survives from the previous cycle.

use crate::config::ArtConfig;
use crate::layout::{self, Node};
use crate::palette::Palette;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub palette: Palette,
    pub nodes: Vec<Node>,
}

impl Scene {
    /// Run the generation pipeline in order: palette, then placement, then
    /// proximity linking.
    pub fn generate(cfg: &ArtConfig, rng: &mut impl Rng) -> Self {
        let palette = Palette::analogous(cfg.palette.base_hue, cfg.palette.hue_range, rng);
        let mut nodes = layout::sample_nodes(cfg, &palette, rng);
        layout::link_neighbors(&mut nodes, cfg.scale());
        Self { palette, nodes }
    }
}

/// Derive the RNG seed for one cycle of a session.
///
/// Hashing the root seed with the cycle counter lets a session replay the
/// same sequence of artworks from one `--seed` while keeping every cycle
/// distinct.
pub fn cycle_seed(root: u64, cycle: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(root.to_le_bytes());
    hasher.update(cycle.to_le_bytes());
    let hash = hasher.finalize();
    u64::from_le_bytes(hash[0..8].try_into().unwrap())
}
