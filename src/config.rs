//! Configuration loading for indraweb.
//!
//! Configuration is loaded from TOML files with environment variable
//! overrides. The merged result is a plain snapshot struct handed into each
//! generation cycle; the core never reads process-wide state.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "config.default.toml";

/// Base canvas edge length the original controls were tuned against.
/// Everything distance-like scales by `size / BASE_CANVAS_SIZE`.
pub const BASE_CANVAS_SIZE: f64 = 800.0;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ArtConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,

    #[serde(default)]
    pub palette: PaletteConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub animation: AnimationConfig,

    #[serde(default)]
    pub brush: BrushConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CanvasConfig {
    /// Square canvas edge length in pixels.
    #[serde(default = "default_size")]
    pub size: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
        }
    }
}

fn default_size() -> u32 {
    800
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaletteConfig {
    /// Anchor hue in degrees, 0-360.
    #[serde(default = "default_base_hue")]
    pub base_hue: f64,

    /// Half-width of the analogous hue spread, in degrees.
    #[serde(default = "default_hue_range")]
    pub hue_range: f64,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            base_hue: default_base_hue(),
            hue_range: default_hue_range(),
        }
    }
}

fn default_base_hue() -> f64 {
    220.0
}

fn default_hue_range() -> f64 {
    30.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Target node count. The sampler may place fewer under tight spacing.
    #[serde(default = "default_num_nodes")]
    pub num_nodes: usize,

    /// Minimum pairwise separation between nodes, in base canvas pixels.
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            num_nodes: default_num_nodes(),
            min_distance: default_min_distance(),
        }
    }
}

fn default_num_nodes() -> usize {
    12
}

fn default_min_distance() -> f64 {
    100.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    /// Alpha increment applied to the animating node on every tick.
    #[serde(default = "default_speed")]
    pub speed: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
        }
    }
}

fn default_speed() -> f64 {
    0.05
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrushConfig {
    /// Global scaling factor applied to every bleed draw.
    #[serde(default = "default_blob_size")]
    pub blob_size: f64,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            blob_size: default_blob_size(),
        }
    }
}

fn default_blob_size() -> f64 {
    5.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// Frame rate of the recorded stream.
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
        }
    }
}

fn default_fps() -> u32 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Also write the generated layout as JSON next to the artwork.
    #[serde(default)]
    pub save_layout: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            save_layout: false,
        }
    }
}

fn default_directory() -> String {
    "output".to_string()
}

impl ArtConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("INDRAWEB").separator("_"))
            .build()?;

        let art_config: ArtConfig = config.try_deserialize().unwrap_or_default();
        Ok(art_config.sanitized())
    }

    /// Drawing scale relative to the base 800px canvas.
    pub fn scale(&self) -> f64 {
        self.canvas.size as f64 / BASE_CANVAS_SIZE
    }

    /// Clamp out values that would stall a cycle. Bad input degrades to the
    /// defaults rather than failing.
    pub fn sanitized(mut self) -> Self {
        if self.animation.speed <= 0.0 {
            warn!(
                speed = self.animation.speed,
                "non-positive animation speed, falling back to default"
            );
            self.animation.speed = default_speed();
        }
        if self.canvas.size == 0 {
            warn!("zero canvas size, falling back to default");
            self.canvas.size = default_size();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_controls() {
        let cfg = ArtConfig::default();
        assert_eq!(cfg.canvas.size, 800);
        assert_eq!(cfg.palette.base_hue, 220.0);
        assert_eq!(cfg.palette.hue_range, 30.0);
        assert_eq!(cfg.layout.num_nodes, 12);
        assert_eq!(cfg.layout.min_distance, 100.0);
        assert_eq!(cfg.animation.speed, 0.05);
        assert_eq!(cfg.capture.fps, 60);
    }

    #[test]
    fn scale_tracks_canvas_size() {
        let mut cfg = ArtConfig::default();
        assert_eq!(cfg.scale(), 1.0);
        cfg.canvas.size = 3200;
        assert_eq!(cfg.scale(), 4.0);
    }

    #[test]
    fn sanitize_recovers_bad_speed() {
        let mut cfg = ArtConfig::default();
        cfg.animation.speed = -1.0;
        let cfg = cfg.sanitized();
        assert_eq!(cfg.animation.speed, 0.05);
    }
}
