//! One live artwork session: generation cycles, ticking, capture.
//!
//! A session owns exactly one live cycle at a time. Regeneration tears the
//! whole tuple down synchronously (capture first, then scene and sequencer)
//! so the next tick can only ever observe the fresh cycle.

use crate::capture::{CaptureController, FrameSink, SinkConfig};
use crate::config::ArtConfig;
use crate::scene::{self, Scene};
use crate::sequencer::{self, Phase, RevealSequencer};
use crate::surface::{Frame, Surface};
use crate::texture::{Backdrop, TextureStyle};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::info;

/// What one animation tick produced.
pub struct Tick {
    pub phase: Phase,
    pub frame: Frame,
    /// Set on the completing tick when a recording was finalized.
    pub artifact: Option<PathBuf>,
}

pub struct ArtSession {
    cfg: ArtConfig,
    root_seed: u64,
    cycle: u64,
    rng: StdRng,
    scene: Scene,
    sequencer: RevealSequencer,
    backdrop: Backdrop,
    capture: CaptureController,
}

impl ArtSession {
    /// Open a session and generate its first cycle.
    pub fn new(cfg: ArtConfig, root_seed: u64, style: TextureStyle) -> Self {
        let cycle = 1;
        let mut rng = StdRng::seed_from_u64(scene::cycle_seed(root_seed, cycle));
        let scene = Scene::generate(&cfg, &mut rng);
        info!(
            root_seed,
            nodes = scene.nodes.len(),
            "session opened"
        );

        Self {
            cfg,
            root_seed,
            cycle,
            rng,
            scene,
            sequencer: RevealSequencer::new(),
            backdrop: Backdrop::new(style),
            capture: CaptureController::new(),
        }
    }

    pub fn config(&self) -> &ArtConfig {
        &self.cfg
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn phase(&self) -> Phase {
        self.sequencer.phase()
    }

    pub fn cursor(&self) -> usize {
        self.sequencer.cursor()
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn is_recording(&self) -> bool {
        self.capture.is_recording()
    }

    /// Tear down the live cycle and build a fresh one.
    ///
    /// Runs in order: interrupt any recording (the partial output is
    /// dropped, not saved), reseed, regenerate palette/nodes/links, rewind
    /// the sequencer. The backdrop cache is only rebuilt when the hue
    /// changed.
    pub fn regenerate(&mut self) -> Result<()> {
        self.capture.discard()?;
        self.cycle += 1;
        self.rng = StdRng::seed_from_u64(scene::cycle_seed(self.root_seed, self.cycle));
        self.scene = Scene::generate(&self.cfg, &mut self.rng);
        self.sequencer.reset();
        info!(
            cycle = self.cycle,
            nodes = self.scene.nodes.len(),
            "generation cycle reset"
        );
        Ok(())
    }

    /// Replace the control parameters, then regenerate with them.
    pub fn reconfigure(&mut self, cfg: ArtConfig) -> Result<()> {
        self.cfg = cfg.sanitized();
        self.regenerate()
    }

    /// Run one frame of the reveal animation.
    ///
    /// The frame goes to the active recording, and a completing tick
    /// finalizes that recording and surfaces its artifact.
    pub fn tick(&mut self, surface: &mut impl Surface) -> Result<Tick> {
        let backdrop = self.backdrop.ensure(&self.cfg, &mut self.rng);
        let phase = self
            .sequencer
            .tick(surface, backdrop, &mut self.scene, &self.cfg, &mut self.rng);

        let frame = surface.frame();
        self.capture.push(&frame)?;

        let artifact = if phase == Phase::Complete {
            self.capture.finish()?
        } else {
            None
        };

        Ok(Tick {
            phase,
            frame,
            artifact,
        })
    }

    /// Render the whole scene as one flat composition.
    pub fn render_flat(&mut self, surface: &mut impl Surface) -> Frame {
        let backdrop = self.backdrop.ensure(&self.cfg, &mut self.rng);
        sequencer::render_flat(surface, backdrop, &self.scene, &self.cfg, &mut self.rng);
        surface.frame()
    }

    /// Begin recording the frame stream. No-op while already recording.
    pub fn record(&mut self, sink: Box<dyn FrameSink>) -> Result<()> {
        let cfg = self.sink_config();
        self.capture.start(sink, &cfg)
    }

    /// Start or stop recording depending on the current flag.
    pub fn toggle_recording(
        &mut self,
        make_sink: impl FnOnce() -> Box<dyn FrameSink>,
    ) -> Result<Option<PathBuf>> {
        let cfg = self.sink_config();
        self.capture.toggle(make_sink, &cfg)
    }

    fn sink_config(&self) -> SinkConfig {
        SinkConfig {
            width: self.cfg.canvas.size,
            height: self.cfg.canvas.size,
            fps: self.cfg.capture.fps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MemorySink;
    use crate::surface::SvgSurface;

    fn fast_config() -> ArtConfig {
        let mut cfg = ArtConfig::default();
        cfg.animation.speed = 0.5;
        cfg
    }

    #[test]
    fn a_run_records_one_frame_per_tick() {
        let mut session = ArtSession::new(fast_config(), 7, TextureStyle::Wash);
        let mut surface = SvgSurface::new(800, 800);

        let sink = MemorySink::new();
        let store = sink.store();
        session.record(Box::new(sink)).unwrap();

        let mut ticks = 0;
        loop {
            let tick = session.tick(&mut surface).unwrap();
            ticks += 1;
            if tick.phase == Phase::Complete {
                // MemorySink produces no file artifact.
                assert!(tick.artifact.is_none());
                break;
            }
        }

        assert_eq!(store.borrow().len(), ticks);
        assert!(!session.is_recording());
    }

    #[test]
    fn regenerate_mid_run_resets_everything() {
        let mut session = ArtSession::new(fast_config(), 11, TextureStyle::Wash);
        let mut surface = SvgSurface::new(800, 800);

        session.record(Box::new(MemorySink::new())).unwrap();
        for _ in 0..4 {
            session.tick(&mut surface).unwrap();
        }
        assert!(session.cursor() > 0);
        assert!(session.is_recording());

        session.regenerate().unwrap();

        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.cursor(), 0);
        assert!(!session.is_recording());
        assert!(session.scene().nodes.iter().all(|n| n.alpha == 0.0));
    }

    #[test]
    fn cycles_differ_but_sessions_replay() {
        let mut a = ArtSession::new(fast_config(), 21, TextureStyle::Wash);
        let b = ArtSession::new(fast_config(), 21, TextureStyle::Wash);

        let first: Vec<(f64, f64)> = a.scene().nodes.iter().map(|n| (n.x, n.y)).collect();
        let replay: Vec<(f64, f64)> = b.scene().nodes.iter().map(|n| (n.x, n.y)).collect();
        assert_eq!(first, replay);

        a.regenerate().unwrap();
        let second: Vec<(f64, f64)> = a.scene().nodes.iter().map(|n| (n.x, n.y)).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn flat_render_produces_a_frame_without_ticking() {
        let mut session = ArtSession::new(fast_config(), 3, TextureStyle::Wash);
        let mut surface = SvgSurface::new(800, 800);

        let frame = session.render_flat(&mut surface);
        assert!(frame.svg.contains("<circle"));
        // The flat path leaves the reveal machine untouched.
        assert_eq!(session.phase(), Phase::Idle);
    }
}
