mod utils;
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rusttype::Font;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use utils::*;
use yarntrack_rs::{Connectivity, PatiencePolicy, PatienceTier, Pipeline, TrackerConfig};

/// Track strand cross-sections through a sequence of segmentation masks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Track targets from a seed frame and write one encoded image per frame
    Track(TrackArgs),
    /// Write the mean row of every target in tracked images to a CSV table
    Centroids(CentroidArgs),
}

#[derive(Args, Debug)]
struct TrackArgs {
    /// Glob of input mask images, ordered by file name
    #[arg(short, long)]
    input: String,

    /// Directory for the tracked images
    #[arg(short, long, default_value = "./Tracked")]
    output: PathBuf,

    /// First frame to process
    #[arg(long, default_value_t = 0)]
    start_index: usize,

    /// One past the last frame to process. Defaults to the number of frames
    #[arg(long)]
    end_index: Option<usize>,

    /// Frame whose components become the targets. Defaults to the start index
    #[arg(long)]
    seed_index: Option<usize>,

    /// Intensity offset added to each target id in the output
    #[arg(short, long, default_value_t = 80)]
    gray_value: u8,

    /// Width of the search window around a target
    #[arg(long, default_value_t = 768)]
    roi_width: u32,

    /// Height of the search window around a target
    #[arg(long, default_value_t = 180)]
    roi_height: u32,

    /// Do not draw target ids
    #[arg(long, default_value_t = false)]
    no_labels: bool,

    /// Join foreground pixels by edges only instead of edges and corners
    #[arg(long, default_value_t = false)]
    four_connected: bool,

    /// Overlap that accepts a match for any target
    #[arg(long, default_value_t = 0.9)]
    strict_iou: f32,

    /// Staleness beyond which each relaxed tier applies
    #[arg(long, value_delimiter = ',', default_values_t = [2, 5, 10])]
    tier_staleness: Vec<u32>,

    /// Overlap accepted by each relaxed tier
    #[arg(long, value_delimiter = ',', default_values_t = [0.8, 0.7, 0.6])]
    tier_iou: Vec<f32>,
}

#[derive(Args, Debug)]
struct CentroidArgs {
    /// Glob of tracked images
    #[arg(short, long)]
    input: String,

    /// The CSV file to write
    #[arg(short, long)]
    output: PathBuf,

    /// Smallest intensity treated as a target
    #[arg(short, long, default_value_t = 81)]
    min_gray: u8,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Track(args) => track(args),
        Command::Centroids(args) => centroid_table::write(&args.input, &args.output, args.min_gray),
    }
}

fn track(args: TrackArgs) -> Result<()> {
    let config = tracker_config(&args)?;

    let frames = frame_files::FrameFiles::from_glob(&args.input)?;
    let end_index = args.end_index.unwrap_or(frames.paths().len());
    let pipeline = Pipeline::new(frames, args.start_index..end_index, args.seed_index)
        .with_context(|| format!("cannot track {}", args.input))?;

    let mut tracker = pipeline.seed(config)?;
    if !args.no_labels {
        let font = Font::try_from_bytes(include_bytes!("../DejaVuSans.ttf") as &[u8])
            .context("embedded label font is invalid")?;
        tracker.with_label_font(font);
    }

    let mut sink = frame_files::FrameWriter::new(&args.output, pipeline.source().paths())?;
    let summary = pipeline.run(&mut tracker, &mut sink)?;
    if !summary.skipped.is_empty() {
        tracing::warn!(frames = ?summary.skipped, "some frames were skipped");
    }
    Ok(())
}

fn tracker_config(args: &TrackArgs) -> Result<TrackerConfig> {
    let tiers = match (args.tier_staleness.as_slice(), args.tier_iou.as_slice()) {
        (&[s1, s2, s3], &[i1, i2, i3]) => [
            PatienceTier::new(s1, i1),
            PatienceTier::new(s2, i2),
            PatienceTier::new(s3, i3),
        ],
        _ => bail!("exactly three tier staleness and three tier iou values are required"),
    };

    let connectivity = if args.four_connected {
        Connectivity::Four
    } else {
        Connectivity::Eight
    };

    let mut config = TrackerConfig::default();
    config
        .with_gray_value(args.gray_value)
        .with_roi(args.roi_width, args.roi_height)
        .with_labeling(!args.no_labels)
        .with_connectivity(connectivity)
        .with_policy(PatiencePolicy::new(args.strict_iou, tiers)?);
    Ok(config)
}
