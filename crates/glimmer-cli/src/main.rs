//! Glimmer CLI - run the falling-light rain headlessly

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::session::{parse_burst, parse_color, BurstSpec, SessionArgs};
use commands::{frames, render, stats, watch};
use glimmer_core::Color;

#[derive(Parser)]
#[command(name = "glimmer")]
#[command(about = "Ambient falling-light particle rain, rendered headlessly", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Surface and simulation options shared by every command
#[derive(Args)]
struct SurfaceOpts {
    /// Surface width in pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Surface height in pixels
    #[arg(long, default_value = "720")]
    height: u32,

    /// Seed for particle randomness (defaults to the system clock)
    #[arg(long)]
    seed: Option<u32>,

    /// Path to a rain config TOML file
    #[arg(long)]
    config: Option<String>,

    /// Fire a burst at mount: x,y or x,y,count (repeatable)
    #[arg(long, value_parser = parse_burst)]
    burst: Vec<BurstSpec>,
}

impl SurfaceOpts {
    fn into_session(self) -> SessionArgs {
        SessionArgs {
            width: self.width,
            height: self.height,
            seed: self.seed,
            config: self.config,
            bursts: self.burst,
        }
    }
}

/// PNG output options
#[derive(Args)]
struct ImageOpts {
    /// Background color the frame is flattened onto
    #[arg(long, default_value = "#0A0A12", value_parser = parse_color)]
    background: Color,

    /// Keep the transparent background instead of flattening
    #[arg(long)]
    transparent: bool,
}

impl ImageOpts {
    fn background(&self) -> Option<Color> {
        if self.transparent {
            None
        } else {
            Some(self.background)
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run on virtual time and save the final frame as PNG
    Render {
        #[command(flatten)]
        surface: SurfaceOpts,

        #[command(flatten)]
        image: ImageOpts,

        /// Output image path
        #[arg(short, long, default_value = "glimmer.png")]
        output: String,

        /// Simulated run time in milliseconds
        #[arg(long, default_value = "3000")]
        duration_ms: u64,
    },

    /// Run on virtual time and save every Nth frame as PNG
    Frames {
        #[command(flatten)]
        surface: SurfaceOpts,

        #[command(flatten)]
        image: ImageOpts,

        /// Output directory
        #[arg(short, long, default_value = "frames")]
        dir: String,

        /// Simulated run time in milliseconds
        #[arg(long, default_value = "3000")]
        duration_ms: u64,

        /// Save one frame out of every N
        #[arg(long, default_value = "1")]
        every: u64,
    },

    /// Run on virtual time and print counters
    Stats {
        #[command(flatten)]
        surface: SurfaceOpts,

        /// Simulated run time in milliseconds
        #[arg(long, default_value = "10000")]
        duration_ms: u64,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Run against the wall clock, printing live counts each second
    Watch {
        #[command(flatten)]
        surface: SurfaceOpts,

        /// How long to run
        #[arg(long, default_value = "10")]
        seconds: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Render {
            surface,
            image,
            output,
            duration_ms,
        } => render::run(render::RenderArgs {
            background: image.background(),
            session: surface.into_session(),
            output,
            duration_ms,
        }),
        Commands::Frames {
            surface,
            image,
            dir,
            duration_ms,
            every,
        } => frames::run(frames::FramesArgs {
            background: image.background(),
            session: surface.into_session(),
            dir,
            duration_ms,
            every,
        }),
        Commands::Stats {
            surface,
            duration_ms,
            format,
        } => stats::run(stats::StatsArgs {
            session: surface.into_session(),
            duration_ms,
            format,
        }),
        Commands::Watch { surface, seconds } => watch::run(watch::WatchArgs {
            session: surface.into_session(),
            seconds,
        }),
    }
}
