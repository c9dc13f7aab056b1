//! Indraweb - generative ink-bleed network artwork.
//!
//! Scatters color-washed nodes under a minimum-separation constraint, links
//! near neighbors into a web, and renders everything as overlapping
//! translucent ink bleeds over a textured backdrop - either as one flat
//! composition or as a frame-stepped reveal that can be captured to video.

pub mod bleed;
pub mod capture;
pub mod config;
pub mod layout;
pub mod palette;
pub mod raster;
pub mod scene;
pub mod sequencer;
pub mod session;
pub mod surface;
pub mod texture;

pub use config::ArtConfig;
pub use scene::Scene;
pub use sequencer::{Phase, RevealSequencer};
pub use session::ArtSession;
pub use surface::{Surface, SvgSurface};
