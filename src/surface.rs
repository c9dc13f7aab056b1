//! Drawing surface seam.
//!
//! The engine draws through the [`Surface`] trait and never touches pixels
//! or markup directly. The bundled [`SvgSurface`] renders each frame as an
//! SVG document: bleeds become blur-and-displacement filtered circles with
//! radial-gradient falloff, which reads as ink diffusing into paper once
//! rasterized.
//!
//! All drawing coordinates are canvas-centered; the surface translates to
//! the SVG viewport internally.

use crate::palette::Hsl;

/// A pre-rendered layer, stamped as a unit under the per-frame content.
#[derive(Debug, Clone)]
pub struct Layer {
    /// A complete inner SVG document (no XML declaration).
    pub svg: String,
}

impl Layer {
    /// Build a layer from a finished frame.
    pub fn from_frame(frame: &Frame) -> Self {
        let start = frame.svg.find("<svg").unwrap_or(0);
        Self {
            svg: frame.svg[start..].to_string(),
        }
    }
}

/// One finished frame of output.
#[derive(Debug, Clone)]
pub struct Frame {
    pub svg: String,
    pub width: u32,
    pub height: u32,
}

/// A filled bleed circle with its per-draw texture parameters.
///
/// The stochastic jitter (offsets, desaturation, opacity wobble) is applied
/// by the caller; this struct carries the already-sampled values.
#[derive(Debug, Clone)]
pub struct BleedStroke {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Hsl,
    /// Opacity on the 0-100 scale used throughout the drawing code.
    pub opacity: f64,
    /// Outward edge diffusion, 0-1. Higher values feather further.
    pub bleed: f64,
    /// Fill texture as (strength, density), each 0-1.
    pub texture: (f64, f64),
}

/// A curved stroke, used by the backdrop composer.
#[derive(Debug, Clone)]
pub struct BezierStroke {
    /// Cubic control points in canvas-centered coordinates.
    pub points: [(f64, f64); 4],
    pub color: Hsl,
    /// Opacity on the 0-100 scale.
    pub opacity: f64,
    pub weight: f64,
}

/// The narrow rendering contract the engine depends on.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Drop all content drawn so far.
    fn clear(&mut self);

    /// Flood the whole surface with one color.
    fn background(&mut self, color: Hsl);

    /// Axis-aligned filled rectangle, canvas-centered coordinates.
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Hsl, opacity: f64);

    /// Stamp a pre-rendered layer aligned to the canvas.
    fn draw_layer(&mut self, layer: &Layer);

    /// One textured ink-bleed circle.
    fn bleed_circle(&mut self, stroke: &BleedStroke);

    /// One curved stroke.
    fn bezier(&mut self, stroke: &BezierStroke);

    /// Snapshot the current content as a finished frame.
    fn frame(&self) -> Frame;
}

/// SVG-backed surface. One instance is reused across frames; `clear` starts
/// the next frame.
#[derive(Debug)]
pub struct SvgSurface {
    width: u32,
    height: u32,
    defs: Vec<String>,
    body: Vec<String>,
}

impl SvgSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            defs: Vec::new(),
            body: Vec::new(),
        }
    }

    fn half_width(&self) -> f64 {
        self.width as f64 / 2.0
    }

    fn half_height(&self) -> f64 {
        self.height as f64 / 2.0
    }
}

impl Surface for SvgSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) {
        self.defs.clear();
        self.body.clear();
    }

    fn background(&mut self, color: Hsl) {
        self.body.push(format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{}" height="{}" fill="{}"/>"#,
            -self.half_width(),
            -self.half_height(),
            self.width,
            self.height,
            color.to_hex()
        ));
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Hsl, opacity: f64) {
        self.body.push(format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" opacity="{:.3}"/>"#,
            x,
            y,
            w,
            h,
            color.to_hex(),
            (opacity / 100.0).clamp(0.0, 1.0)
        ));
    }

    fn draw_layer(&mut self, layer: &Layer) {
        self.body.push(format!(
            r#"<g transform="translate({:.1} {:.1})">{}</g>"#,
            -self.half_width(),
            -self.half_height(),
            layer.svg
        ));
    }

    fn bleed_circle(&mut self, stroke: &BleedStroke) {
        let id = self.defs.len();
        let hex = stroke.color.to_hex();

        // Edge falloff: stronger bleed pulls the solid core inward and
        // feathers the rim further out.
        let core = (60.0 - stroke.bleed * 30.0).clamp(10.0, 90.0);
        let (strength, density) = stroke.texture;
        let frequency = 0.012 + density * 0.03;
        let displacement = stroke.radius * (0.15 + strength * 0.25);
        let blur = stroke.radius * stroke.bleed * 0.3;

        self.defs.push(format!(
            r#"<radialGradient id="bg{0}">
  <stop offset="0%" stop-color="{1}" stop-opacity="0.95"/>
  <stop offset="{2:.0}%" stop-color="{1}" stop-opacity="0.65"/>
  <stop offset="100%" stop-color="{1}" stop-opacity="0"/>
</radialGradient>
<filter id="bf{0}" x="-60%" y="-60%" width="220%" height="220%">
  <feTurbulence type="fractalNoise" baseFrequency="{3:.4}" numOctaves="2" result="noise"/>
  <feDisplacementMap in="SourceGraphic" in2="noise" scale="{4:.1}" result="ink"/>
  <feGaussianBlur in="ink" stdDeviation="{5:.2}"/>
</filter>"#,
            id, hex, core, frequency, displacement, blur
        ));

        self.body.push(format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="url(#bg{})" filter="url(#bf{})" opacity="{:.3}"/>"#,
            stroke.x,
            stroke.y,
            stroke.radius,
            id,
            id,
            (stroke.opacity / 100.0).clamp(0.0, 1.0)
        ));
    }

    fn bezier(&mut self, stroke: &BezierStroke) {
        let [p0, p1, p2, p3] = stroke.points;
        self.body.push(format!(
            r#"<path d="M {:.1} {:.1} C {:.1} {:.1}, {:.1} {:.1}, {:.1} {:.1}" fill="none" stroke="{}" stroke-width="{:.2}" opacity="{:.3}" stroke-linecap="round"/>"#,
            p0.0,
            p0.1,
            p1.0,
            p1.1,
            p2.0,
            p2.1,
            p3.0,
            p3.1,
            stroke.color.to_hex(),
            stroke.weight,
            (stroke.opacity / 100.0).clamp(0.0, 1.0)
        ));
    }

    fn frame(&self) -> Frame {
        let svg = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">
<defs>
{defs}
</defs>
<g transform="translate({hw:.1} {hh:.1})">
{body}
</g>
</svg>"#,
            w = self.width,
            h = self.height,
            hw = self.half_width(),
            hh = self.half_height(),
            defs = self.defs.join("\n"),
            body = self.body.join("\n"),
        );

        Frame {
            svg,
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke() -> BleedStroke {
        BleedStroke {
            x: 10.0,
            y: -20.0,
            radius: 30.0,
            color: Hsl::new(220.0, 55.0, 50.0),
            opacity: 90.0,
            bleed: 0.5,
            texture: (0.5, 0.5),
        }
    }

    #[test]
    fn frame_contains_drawn_elements() {
        let mut surface = SvgSurface::new(800, 800);
        surface.background(Hsl::new(40.0, 10.0, 95.0));
        surface.bleed_circle(&stroke());
        let frame = surface.frame();

        assert!(frame.svg.starts_with("<?xml"));
        assert!(frame.svg.contains("<circle"));
        assert!(frame.svg.contains("radialGradient"));
        assert!(frame.svg.contains("feDisplacementMap"));
        assert_eq!(frame.width, 800);
    }

    #[test]
    fn clear_starts_an_empty_frame() {
        let mut surface = SvgSurface::new(400, 400);
        surface.bleed_circle(&stroke());
        surface.clear();
        let frame = surface.frame();
        assert!(!frame.svg.contains("<circle"));
    }

    #[test]
    fn each_bleed_gets_its_own_defs() {
        let mut surface = SvgSurface::new(400, 400);
        surface.bleed_circle(&stroke());
        surface.bleed_circle(&stroke());
        let frame = surface.frame();
        assert!(frame.svg.contains("url(#bg0)"));
        assert!(frame.svg.contains("url(#bg1)"));
    }

    #[test]
    fn layer_round_trip_strips_the_declaration() {
        let mut surface = SvgSurface::new(200, 200);
        surface.background(Hsl::new(0.0, 0.0, 100.0));
        let layer = Layer::from_frame(&surface.frame());
        assert!(layer.svg.starts_with("<svg"));

        let mut target = SvgSurface::new(200, 200);
        target.clear();
        target.draw_layer(&layer);
        let frame = target.frame();
        assert!(frame.svg.contains("translate(-100.0 -100.0)"));
        assert!(frame.svg.matches("<svg").count() >= 2);
    }
}
