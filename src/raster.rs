//! Frame rasterization and PNG export.
//!
//! Frames come off the surface as SVG; everything that needs pixels (the
//! video encoder, the save-image action) goes through here.

use crate::surface::Frame;
use anyhow::{anyhow, Context, Result};
use resvg::tiny_skia;
use std::path::Path;

/// Rasterize a frame at its native size.
pub fn rasterize(frame: &Frame) -> Result<tiny_skia::Pixmap> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(&frame.svg, &options).context("failed to parse frame svg")?;

    let mut pixmap = tiny_skia::Pixmap::new(frame.width, frame.height)
        .ok_or_else(|| anyhow!("cannot rasterize a zero-sized frame"))?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    Ok(pixmap)
}

/// Rasterize and encode a frame as PNG bytes.
pub fn png_bytes(frame: &Frame) -> Result<Vec<u8>> {
    rasterize(frame)?
        .encode_png()
        .context("failed to encode frame as png")
}

/// Rasterize a frame straight to a PNG file.
pub fn write_png(frame: &Frame, path: &Path) -> Result<()> {
    rasterize(frame)?
        .save_png(path)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Hsl;
    use crate::surface::{Surface, SvgSurface};

    #[test]
    fn rasterizes_a_simple_frame() {
        let mut surface = SvgSurface::new(64, 64);
        surface.background(Hsl::new(0.0, 0.0, 100.0));
        let pixmap = rasterize(&surface.frame()).unwrap();
        assert_eq!(pixmap.width(), 64);
        assert_eq!(pixmap.height(), 64);
        // A white wash should leave no transparent pixels.
        assert!(pixmap.pixels().iter().all(|p| p.alpha() == 255));
    }

    #[test]
    fn png_bytes_carry_the_signature() {
        let mut surface = SvgSurface::new(32, 32);
        surface.background(Hsl::new(220.0, 50.0, 50.0));
        let bytes = png_bytes(&surface.frame()).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
