//! Indraweb CLI - generate ink-bleed network artwork, still or animated.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use indraweb::capture::{FfmpegSink, PngDirSink};
use indraweb::config::ArtConfig;
use indraweb::raster;
use indraweb::sequencer::Phase;
use indraweb::session::ArtSession;
use indraweb::surface::SvgSurface;
use indraweb::texture::TextureStyle;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "indraweb")]
#[command(about = "Generate ink-bleed network artwork from scattered, proximity-linked nodes")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "indraweb.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Render one flat composition
    Generate {
        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for generation
        #[arg(short = 'S', long)]
        seed: Option<u64>,

        /// Anchor hue in degrees (0-360)
        #[arg(long)]
        hue: Option<f64>,

        /// Analogous hue spread in degrees
        #[arg(long)]
        hue_range: Option<f64>,

        /// Target node count
        #[arg(long)]
        nodes: Option<usize>,

        /// Minimum node separation in pixels
        #[arg(long)]
        min_distance: Option<f64>,

        /// Bleed size multiplier
        #[arg(long)]
        blob_size: Option<f64>,

        /// Canvas edge length in pixels
        #[arg(long)]
        size: Option<u32>,

        /// Backdrop texture style
        #[arg(short, long, value_enum, default_value = "layered")]
        texture: TextureArg,

        /// Also rasterize the artwork to PNG
        #[arg(long)]
        png: bool,

        /// Save the node layout as JSON next to the artwork
        #[arg(long)]
        save_layout: bool,
    },

    /// Run the animated reveal frame by frame
    Animate {
        /// Output path for the completed frame
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for generation
        #[arg(short = 'S', long)]
        seed: Option<u64>,

        /// Anchor hue in degrees (0-360)
        #[arg(long)]
        hue: Option<f64>,

        /// Analogous hue spread in degrees
        #[arg(long)]
        hue_range: Option<f64>,

        /// Target node count
        #[arg(long)]
        nodes: Option<usize>,

        /// Minimum node separation in pixels
        #[arg(long)]
        min_distance: Option<f64>,

        /// Bleed size multiplier
        #[arg(long)]
        blob_size: Option<f64>,

        /// Canvas edge length in pixels
        #[arg(long)]
        size: Option<u32>,

        /// Alpha increment per frame
        #[arg(long)]
        speed: Option<f64>,

        /// Backdrop texture style
        #[arg(short, long, value_enum, default_value = "wash")]
        texture: TextureArg,

        /// Record the run to an MP4 (requires ffmpeg on PATH)
        #[arg(long)]
        record: Option<PathBuf>,

        /// Write every frame as a numbered PNG into this directory
        #[arg(long, conflicts_with = "record")]
        frames: Option<PathBuf>,

        /// Also rasterize the completed frame to PNG
        #[arg(long)]
        png: bool,
    },

    /// Render every texture style at several sizes
    Showcase {
        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Seed for consistent results
        #[arg(short = 'S', long, default_value = "42")]
        seed: u64,
    },
}

#[derive(Clone, ValueEnum, Debug)]
enum TextureArg {
    /// Flat complementary wash
    Wash,
    /// Dense curved-stroke bands
    Layered,
}

impl TextureArg {
    fn to_style(&self) -> TextureStyle {
        match self {
            TextureArg::Wash => TextureStyle::Wash,
            TextureArg::Layered => TextureStyle::Layered,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            TextureArg::Wash => "wash",
            TextureArg::Layered => "layered",
        }
    }

    fn all() -> Vec<TextureArg> {
        vec![TextureArg::Wash, TextureArg::Layered]
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_overrides(
    config: &mut ArtConfig,
    hue: Option<f64>,
    hue_range: Option<f64>,
    nodes: Option<usize>,
    min_distance: Option<f64>,
    blob_size: Option<f64>,
    size: Option<u32>,
    speed: Option<f64>,
) {
    if let Some(hue) = hue {
        config.palette.base_hue = hue;
    }
    if let Some(hue_range) = hue_range {
        config.palette.hue_range = hue_range;
    }
    if let Some(nodes) = nodes {
        config.layout.num_nodes = nodes;
    }
    if let Some(min_distance) = min_distance {
        config.layout.min_distance = min_distance;
    }
    if let Some(blob_size) = blob_size {
        config.brush.blob_size = blob_size;
    }
    if let Some(size) = size {
        config.canvas.size = size;
    }
    if let Some(speed) = speed {
        config.animation.speed = speed;
    }
}

fn connection_count(session: &ArtSession) -> usize {
    session
        .scene()
        .nodes
        .iter()
        .map(|n| n.neighbors.len())
        .sum::<usize>()
        / 2
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("indraweb=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = ArtConfig::load(&cli.config)?;

    match cli.command {
        Commands::Generate {
            output,
            seed,
            hue,
            hue_range,
            nodes,
            min_distance,
            blob_size,
            size,
            texture,
            png,
            save_layout,
        } => {
            let mut config = config;
            apply_overrides(
                &mut config,
                hue,
                hue_range,
                nodes,
                min_distance,
                blob_size,
                size,
                None,
            );
            let config = config.sanitized();
            let seed = seed.unwrap_or_else(rand::random);

            let canvas = config.canvas.size;
            let save_layout = save_layout || config.output.save_layout;
            let output_dir = PathBuf::from(&config.output.directory);

            let mut session = ArtSession::new(config, seed, texture.to_style());
            let mut surface = SvgSurface::new(canvas, canvas);

            println!(
                "Generating {} composition with seed {}...",
                texture.name(),
                seed
            );
            println!(
                "  {} nodes, {} connections",
                session.scene().nodes.len(),
                connection_count(&session)
            );

            let frame = session.render_flat(&mut surface);

            fs::create_dir_all(&output_dir)?;
            let output_path =
                output.unwrap_or_else(|| output_dir.join(format!("indras_web_{}.svg", seed)));
            fs::write(&output_path, &frame.svg)?;
            println!("Saved to {}", output_path.display());

            if png {
                let png_path = output_path.with_extension("png");
                raster::write_png(&frame, &png_path)?;
                println!("Saved to {}", png_path.display());
            }

            if save_layout {
                let layout_path = output_path.with_extension("json");
                let layout_json = serde_json::to_string_pretty(session.scene())?;
                fs::write(&layout_path, layout_json)?;
                println!("Saved layout to {}", layout_path.display());
            }
        }

        Commands::Animate {
            output,
            seed,
            hue,
            hue_range,
            nodes,
            min_distance,
            blob_size,
            size,
            speed,
            texture,
            record,
            frames,
            png,
        } => {
            let mut config = config;
            apply_overrides(
                &mut config,
                hue,
                hue_range,
                nodes,
                min_distance,
                blob_size,
                size,
                speed,
            );
            let config = config.sanitized();
            let seed = seed.unwrap_or_else(rand::random);

            let canvas = config.canvas.size;
            let output_dir = PathBuf::from(&config.output.directory);

            let mut session = ArtSession::new(config, seed, texture.to_style());
            let mut surface = SvgSurface::new(canvas, canvas);

            println!("Animating reveal with seed {}...", seed);
            println!(
                "  {} nodes, {} connections",
                session.scene().nodes.len(),
                connection_count(&session)
            );

            if let Some(path) = record {
                session.record(Box::new(FfmpegSink::new(path)))?;
            } else if let Some(dir) = frames {
                session.record(Box::new(PngDirSink::new(dir)))?;
            }

            let mut ticks = 0u64;
            let final_frame = loop {
                let tick = session.tick(&mut surface)?;
                ticks += 1;
                if tick.phase == Phase::Complete {
                    if let Some(artifact) = tick.artifact {
                        println!("Recording saved to {}", artifact.display());
                    }
                    break tick.frame;
                }
            };
            println!("Revealed in {} frames", ticks);

            fs::create_dir_all(&output_dir)?;
            let output_path =
                output.unwrap_or_else(|| output_dir.join(format!("indras_web_{}.svg", seed)));
            fs::write(&output_path, &final_frame.svg)?;
            println!("Saved to {}", output_path.display());

            if png {
                let png_path = output_path.with_extension("png");
                raster::write_png(&final_frame, &png_path)?;
                println!("Saved to {}", png_path.display());
            }
        }

        Commands::Showcase { output_dir, seed } => {
            let output_dir = output_dir
                .unwrap_or_else(|| PathBuf::from(&config.output.directory).join("showcase"));

            fs::create_dir_all(&output_dir)?;

            println!("Generating showcase with seed {}...", seed);

            let sizes: [(u32, &str); 3] = [(800, "800"), (1600, "1600"), (3200, "3k")];

            for texture in TextureArg::all() {
                for (size, label) in &sizes {
                    let mut variant = config.clone();
                    variant.canvas.size = *size;
                    let variant = variant.sanitized();

                    let mut session = ArtSession::new(variant, seed, texture.to_style());
                    let mut surface = SvgSurface::new(*size, *size);
                    let frame = session.render_flat(&mut surface);

                    let filename = format!("{}_{}.svg", texture.name(), label);
                    let path = output_dir.join(&filename);
                    fs::write(&path, &frame.svg)?;
                    println!("  Created {}", filename);
                }
            }

            println!("Done! Showcase saved to {}", output_dir.display());
        }
    }

    Ok(())
}
