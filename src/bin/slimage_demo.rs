//! `slimage_demo` - load an image, do something with it, save it.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slimage::{
    io, parallel, AnonymousImage, AnyImage, Element, Image, Pixel3ub, ThreadingOptions, WorkerPool,
};

#[derive(Parser, Debug)]
#[command(name = "slimage_demo")]
#[command(version, about = "Small demonstrations of the slimage containers", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print width, height and pixel format as JSON.
    Info {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Mirror an image top to bottom.
    Flip {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// Paint a color gradient band across the top of an image.
    Paint {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
        /// Height of the band in pixels.
        #[arg(long, default_value = "16", value_name = "INT")]
        band: u32,
    },

    /// Invert every sample, spreading the work over a worker pool.
    Invert {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
        /// Number of worker threads (defaults to the available cores).
        #[arg(short, long, value_name = "INT")]
        threads: Option<usize>,
    },

    /// Read an ASCII 16-bit PGM file, optionally converting it.
    Pgm {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// Save as a 16-bit image file, format taken from the extension.
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("slimage={log_level},slimage_demo={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args.command) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(command: &Command) -> Result<()> {
    match command {
        Command::Info { input } => {
            let image = io::load(input).with_context(|| format!("Failed to load {}", input.display()))?;
            println!("{}", serde_json::to_string_pretty(&image.info())?);
        }

        Command::Flip { input, output } => {
            let image = io::load(input).with_context(|| format!("Failed to load {}", input.display()))?;
            let flipped = match image.as_any() {
                AnyImage::Gray8(img) => AnonymousImage::from(img.flip_y()),
                AnyImage::Rgb8(img) => AnonymousImage::from(img.flip_y()),
                AnyImage::Rgba8(img) => AnonymousImage::from(img.flip_y()),
                AnyImage::Gray16(img) => AnonymousImage::from(img.flip_y()),
            };
            io::save(output, &flipped).context("Failed to save flipped image")?;
            info!("Flipped {} -> {}", input.display(), output.display());
        }

        Command::Paint { input, output, band } => {
            let mut img = io::load_3ub(input).with_context(|| format!("Failed to load {}", input.display()))?;
            let band = (*band).min(img.height());
            for x in 0..img.width() {
                let color = Pixel3ub::rgb(0, ((x * 16) % 255) as u8, ((x * 8) % 255) as u8);
                for y in 0..band {
                    img.set(x, y, &color);
                }
            }
            io::save_3ub(output, &img).context("Failed to save painted image")?;
            info!("Painted {band} rows into {}", output.display());
        }

        Command::Invert {
            input,
            output,
            threads,
        } => {
            let options = match threads {
                Some(threads) => ThreadingOptions { threads: *threads },
                None => ThreadingOptions::default(),
            };
            let pool = WorkerPool::new(&options).context("Failed to start worker pool")?;
            let image = io::load(input).with_context(|| format!("Failed to load {}", input.display()))?;
            let inverted = match image.as_any() {
                AnyImage::Gray8(img) => AnonymousImage::from(invert(&pool, img, u8::MAX)),
                AnyImage::Rgb8(img) => AnonymousImage::from(invert(&pool, img, u8::MAX)),
                AnyImage::Rgba8(img) => AnonymousImage::from(invert(&pool, img, u8::MAX)),
                AnyImage::Gray16(img) => AnonymousImage::from(invert(&pool, img, u16::MAX)),
            };
            io::save(output, &inverted).context("Failed to save inverted image")?;
            info!(threads = pool.threads(), "Inverted {} -> {}", input.display(), output.display());
        }

        Command::Pgm { input, output } => {
            let img = io::load_pgm16(input).with_context(|| format!("Failed to read {}", input.display()))?;
            let image = AnonymousImage::from(img);
            println!("{}", serde_json::to_string_pretty(&image.info())?);
            if let Some(output) = output {
                io::save(output, &image).context("Failed to save converted image")?;
                info!("Converted {} -> {}", input.display(), output.display());
            }
        }
    }

    Ok(())
}

fn invert<K: Element, const CC: usize>(pool: &WorkerPool, img: &Image<K, CC>, max: K) -> Image<K, CC> {
    let mut out = img.clone();
    parallel::process(pool, &mut out, |px| {
        for v in px {
            *v = max - *v;
        }
    });
    out
}
