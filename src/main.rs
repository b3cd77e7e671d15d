//! Cubeterra CLI - cube-sphere terrain with droplet erosion and seamless faces.
//!
//! Fills the six faces from fractal noise, erodes them with water droplets
//! that travel freely across face seams, repairs the seams and writes one
//! 16-bit PNG per face.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use cubeterra::erosion::ErosionParams;
use cubeterra::export::{export_field_png, PngExportOptions};
use cubeterra::geometry::CubeTopology;
use cubeterra::noise::FractalNoiseConfig;
use cubeterra::pipeline::{ErosionStage, HeightmapStage, Pipeline, SeamStage, StageConfig};
use cubeterra::seams::{SeamOptions, SeamStitcher};
use cubeterra::terrain::HeightField;

/// Cube-sphere terrain generator.
#[derive(Parser)]
#[command(name = "cubeterra")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate, erode and stitch a cube-sphere height field.
    Generate {
        /// Per-face resolution in pixels (e.g., 256, 512, 1024).
        #[arg(short, long, default_value = "256")]
        resolution: u32,

        /// Random seed for reproducible generation.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output directory for generated files.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for output files.
        #[arg(short, long, default_value = "terrain")]
        name: String,

        /// Number of noise octaves (1-16).
        #[arg(long, default_value = "6")]
        octaves: usize,

        /// Base noise frequency.
        #[arg(long, default_value = "2.0")]
        frequency: f64,

        /// Frequency multiplier per octave (lacunarity).
        #[arg(long, default_value = "2.0")]
        lacunarity: f64,

        /// Amplitude decay per octave (persistence).
        #[arg(long, default_value = "0.5")]
        persistence: f64,

        /// Use the rugged noise preset instead of the octave options.
        #[arg(long)]
        rugged: bool,

        /// Erosion parameter file (TOML); see `dump-params`.
        #[arg(long)]
        params: Option<PathBuf>,

        /// Number of erosion droplets.
        #[arg(long, default_value = "100000")]
        droplets: u64,

        /// Skip droplet erosion.
        #[arg(long)]
        skip_erosion: bool,

        /// Skip seam stitching.
        #[arg(long)]
        skip_seams: bool,

        /// Only stitch the seam samples near cube corners.
        #[arg(long)]
        corners_only: bool,

        /// Run extra droplets from every face corner after stitching.
        #[arg(long)]
        erode_corners: bool,

        /// Droplets per face corner when `--erode-corners` is set.
        #[arg(long, default_value = "4")]
        corner_droplets: u32,

        /// Stretch the final height range over the full 16 bits.
        #[arg(long)]
        stretch: bool,
    },

    /// Display information about a cube-sphere resolution.
    Info {
        /// Per-face resolution in pixels.
        #[arg(short, long, default_value = "256")]
        resolution: u32,
    },

    /// Write the default erosion parameters as TOML.
    DumpParams {
        /// Destination file.
        #[arg(short, long, default_value = "erosion.toml")]
        output: PathBuf,
    },
}

struct GenerateOptions {
    resolution: u32,
    seed: Option<u64>,
    output: PathBuf,
    name: String,
    noise: NoiseOptions,
    params: Option<PathBuf>,
    droplets: u64,
    skip_erosion: bool,
    skip_seams: bool,
    seams: SeamOptions,
    stretch: bool,
}

struct NoiseOptions {
    octaves: usize,
    frequency: f64,
    lacunarity: f64,
    persistence: f64,
    rugged: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            resolution,
            seed,
            output,
            name,
            octaves,
            frequency,
            lacunarity,
            persistence,
            rugged,
            params,
            droplets,
            skip_erosion,
            skip_seams,
            corners_only,
            erode_corners,
            corner_droplets,
            stretch,
        } => {
            run_generate(GenerateOptions {
                resolution,
                seed,
                output,
                name,
                noise: NoiseOptions {
                    octaves,
                    frequency,
                    lacunarity,
                    persistence,
                    rugged,
                },
                params,
                droplets,
                skip_erosion,
                skip_seams,
                seams: SeamOptions {
                    corners_only,
                    erode_corners,
                    corner_droplets,
                },
                stretch,
            });
        }
        Commands::Info { resolution } => {
            run_info(resolution);
        }
        Commands::DumpParams { output } => {
            ErosionParams::default().save_to_file(&output).unwrap_or_else(|e| {
                eprintln!("Error writing parameters: {}", e);
                std::process::exit(1);
            });
            println!("Wrote default erosion parameters to {}", output.display());
        }
    }
}

fn run_generate(options: GenerateOptions) {
    // Validate parameters
    if !(16..=8192).contains(&options.resolution) {
        eprintln!("Error: Resolution must be between 16 and 8192");
        std::process::exit(1);
    }

    if !(1..=16).contains(&options.noise.octaves) {
        eprintln!("Error: Octaves must be between 1 and 16");
        std::process::exit(1);
    }

    let params = match &options.params {
        Some(path) => ErosionParams::load_from_file(path).unwrap_or_else(|e| {
            eprintln!("Error loading {}: {}", path.display(), e);
            std::process::exit(1);
        }),
        None => ErosionParams::default(),
    }
    .clamped();

    // Generate seed if not provided
    let seed = options.seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });

    println!("Cubeterra - Cube-Sphere Terrain Generator");
    println!("=========================================");
    println!("Resolution: {}x{} per face", options.resolution, options.resolution);
    println!("Seed: {}", seed);
    println!("Output: {}", options.output.display());

    let start = Instant::now();

    let noise_config = if options.noise.rugged {
        println!("Preset: rugged");
        FractalNoiseConfig::rugged(seed as u32)
    } else {
        FractalNoiseConfig {
            octaves: options.noise.octaves,
            frequency: options.noise.frequency,
            lacunarity: options.noise.lacunarity,
            persistence: options.noise.persistence,
            seed: seed as u32,
        }
    };

    println!("\nRunning generation pipeline...");
    let mut pipeline = Pipeline::new(StageConfig::with_noise(noise_config));
    pipeline.add_stage(HeightmapStage);

    if !options.skip_erosion {
        pipeline.add_stage(ErosionStage::new(params.clone(), options.droplets, seed));
        println!(
            "Erosion enabled: {} droplets, lifetime {}",
            options.droplets, params.max_droplet_lifetime
        );
    } else {
        println!("Erosion: SKIPPED");
    }

    if !options.skip_seams {
        let mode = if options.seams.corners_only { "corners only" } else { "all edges" };
        println!(
            "Seam stitching enabled: {}{}",
            mode,
            if options.seams.erode_corners { ", corner erosion" } else { "" }
        );
        pipeline.add_stage(SeamStage::new(SeamStitcher::new(options.seams, params)));
    } else {
        println!("Seam stitching: SKIPPED");
    }

    let mut field = HeightField::filled(options.resolution, 0.0);
    pipeline
        .run_with_callbacks(
            &mut field,
            |name, i, total| {
                println!("  [{}/{}] Starting: {}", i + 1, total, name);
            },
            |name, i, total| {
                println!("  [{}/{}] Completed: {}", i + 1, total, name);
            },
        )
        .unwrap_or_else(|e| {
            eprintln!("Error during generation: {}", e);
            std::process::exit(1);
        });

    println!("Generation completed in {:.2?}", start.elapsed());

    let (min_h, max_h) = field.height_range();
    println!("Height range: [{:.4}, {:.4}]", min_h, max_h);

    println!("\nExporting heightmaps...");
    let export_start = Instant::now();

    let export_options = if options.stretch && min_h < max_h {
        PngExportOptions::auto_range(&field)
    } else {
        PngExportOptions::default()
    };
    export_field_png(&field, &options.output, &options.name, &export_options).unwrap_or_else(|e| {
        eprintln!("Error exporting PNG: {}", e);
        std::process::exit(1);
    });
    println!("  Exported 6 PNG files: {}_*.png", options.name);
    println!("Export completed in {:.2?}", export_start.elapsed());
}

fn run_info(resolution: u32) {
    if resolution < 2 {
        eprintln!("Error: Resolution must be at least 2");
        std::process::exit(1);
    }

    let topology = CubeTopology::new(resolution);
    let pixels_per_face = (resolution as u64) * (resolution as u64);
    let total_pixels = pixels_per_face * 6;
    let seam_samples = 6 * (4 * resolution as u64 - 4);

    let bytes_heights = total_pixels * 8; // f64
    let bytes_png = pixels_per_face * 2 * 6; // 16-bit per face

    println!("Cubeterra - Cube-Sphere Configuration Info");
    println!("==========================================");
    println!();
    println!("Resolution: {}x{} per face", resolution, resolution);
    println!("Total faces: 6");
    println!("Cube edges:   {}", topology.cube_edges().len());
    println!("Cube corners: {}", topology.cube_corners().len());
    println!();
    println!("Sample counts:");
    println!("  Per face:  {:>12} samples", pixels_per_face);
    println!("  Total:     {:>12} samples", total_pixels);
    println!("  On seams:  {:>12} samples", seam_samples);
    println!();
    println!("Memory usage (in-memory):");
    println!("  Heights:   {:>12} bytes ({:.2} MB)", bytes_heights, bytes_heights as f64 / 1024.0 / 1024.0);
    println!();
    println!("Export file sizes:");
    println!("  PNG (16-bit): {:>10} bytes ({:.2} MB) - 6 files", bytes_png, bytes_png as f64 / 1024.0 / 1024.0);
    println!();

    if resolution <= 5 {
        println!("Note: faces narrower than 6 samples only get corner repair");
    }
    if !is_power_of_two(resolution) {
        println!("Note: most engines expect power-of-2 tile widths");
    }
}

fn is_power_of_two(n: u32) -> bool {
    n > 0 && (n & (n - 1)) == 0
}
