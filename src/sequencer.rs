//! The reveal state machine.
//!
//! A generation cycle animates in one node at a time: the active node's
//! alpha ramps up a fixed step per tick while the web of already-revealed
//! connections is re-drawn fresh every frame over a cleared surface. When
//! the last node lands the sequencer renders the full composition once and
//! reports completion so the host can stop ticking.
//!
//! The non-animated path ([`render_flat`]) draws the same scene in three
//! flat passes with no incremental reveal.

use crate::bleed::{self, BlobStyle};
use crate::config::ArtConfig;
use crate::scene::Scene;
use crate::surface::{Layer, Surface};
use crate::texture;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// Alpha value at which a node counts as fully revealed.
pub const ANIMATION_DURATION: f64 = 1.0;

/// Connection bleed radius band while animating, in base units.
const CONNECTION_SIZE: (f64, f64) = (10.0, 15.0);
/// Larger band used by the flat composition.
const CONNECTION_SIZE_FLAT: (f64, f64) = (15.0, 25.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fresh cycle, nothing drawn yet.
    Idle,
    /// Node at this index is ramping in.
    Animating(usize),
    /// Terminal frame rendered; the host should stop ticking.
    Complete,
}

#[derive(Debug)]
pub struct RevealSequencer {
    phase: Phase,
    revealed: HashSet<usize>,
}

impl Default for RevealSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl RevealSequencer {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            revealed: HashSet::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Indices of nodes that finished their ramp this cycle.
    pub fn revealed(&self) -> &HashSet<usize> {
        &self.revealed
    }

    /// Index of the node currently (or next) being animated.
    pub fn cursor(&self) -> usize {
        match self.phase {
            Phase::Idle => 0,
            Phase::Animating(k) => k,
            Phase::Complete => self.revealed.len(),
        }
    }

    /// Rewind for a new generation cycle.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.revealed.clear();
    }

    /// Advance the animation by one frame, drawing it onto `surface`.
    ///
    /// Returns the phase in effect after the tick. A tick always runs to
    /// completion; cancellation only happens between ticks via [`reset`].
    ///
    /// [`reset`]: RevealSequencer::reset
    pub fn tick(
        &mut self,
        surface: &mut impl Surface,
        backdrop: &Layer,
        scene: &mut Scene,
        cfg: &ArtConfig,
        rng: &mut impl Rng,
    ) -> Phase {
        surface.clear();
        surface.draw_layer(backdrop);

        if self.phase == Phase::Idle {
            self.phase = if scene.nodes.is_empty() {
                debug!("empty scene, completing immediately");
                Phase::Complete
            } else {
                Phase::Animating(0)
            };
        }

        if let Phase::Animating(k) = self.phase {
            let n = scene.nodes.len();
            let speed = cfg.animation.speed;

            {
                let node = &mut scene.nodes[k];
                node.alpha = (node.alpha + speed).min(ANIMATION_DURATION);
            }

            let node = &scene.nodes[k];
            bleed::node_bleed(surface, node, node.alpha, &BlobStyle::animated(), cfg, rng);

            // Connections of the active node to nodes already on screen.
            for &j in &node.neighbors {
                if j < k {
                    bleed::connection_bleed(
                        surface,
                        node,
                        &scene.nodes[j],
                        CONNECTION_SIZE,
                        cfg,
                        rng,
                    );
                }
            }

            // The surface was cleared, so the settled part of the web is
            // laid down again: one bleed per revealed pair.
            for i in 0..k {
                let a = &scene.nodes[i];
                for &j in &a.neighbors {
                    if j < i {
                        bleed::connection_bleed(
                            surface,
                            a,
                            &scene.nodes[j],
                            CONNECTION_SIZE,
                            cfg,
                            rng,
                        );
                    }
                }
            }

            if scene.nodes[k].alpha >= ANIMATION_DURATION {
                self.revealed.insert(k);
                if k + 1 == n {
                    self.phase = Phase::Complete;
                    // The completing frame is replaced by the terminal
                    // composition below.
                    surface.clear();
                    surface.draw_layer(backdrop);
                } else {
                    self.phase = Phase::Animating(k + 1);
                }
            }
        }

        if self.phase == Phase::Complete {
            for node in &scene.nodes {
                bleed::node_bleed(
                    surface,
                    node,
                    ANIMATION_DURATION,
                    &BlobStyle::animated(),
                    cfg,
                    rng,
                );
            }
            for (i, node) in scene.nodes.iter().enumerate() {
                for &j in &node.neighbors {
                    if j < i {
                        bleed::connection_bleed(
                            surface,
                            node,
                            &scene.nodes[j],
                            CONNECTION_SIZE,
                            cfg,
                            rng,
                        );
                    }
                }
            }
        }

        self.phase
    }
}

/// Draw the whole scene in one pass: base blobs, connections, highlight
/// blobs, then a final atmospheric stroke layer.
pub fn render_flat(
    surface: &mut impl Surface,
    backdrop: &Layer,
    scene: &Scene,
    cfg: &ArtConfig,
    rng: &mut impl Rng,
) {
    surface.clear();
    surface.draw_layer(backdrop);

    for node in &scene.nodes {
        bleed::node_bleed(surface, node, 1.0, &BlobStyle::flat(1.0), cfg, rng);
    }

    for node in &scene.nodes {
        for &j in &node.neighbors {
            bleed::connection_bleed(
                surface,
                node,
                &scene.nodes[j],
                CONNECTION_SIZE_FLAT,
                cfg,
                rng,
            );
        }
    }

    for node in &scene.nodes {
        bleed::node_bleed(surface, node, 1.0, &BlobStyle::flat(0.7), cfg, rng);
    }

    texture::atmospheric_pass(surface, cfg, rng);
}
