//! Command-line front end for track normalization, labeling and inversion.
//!
//! ```text
//! track-labeler normalize <DIR> <FILES>... [--waypoints]
//! track-labeler label <RAW_DIR> <CLEAN_DIR> <FILES>...
//! track-labeler invert <CSV> <GPX> [--name NAME]
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use track_labeler::{
    invert::{write_gpx_file, InvertOptions},
    pipeline::{build_training_pool, export_track, export_training_pool, read_track},
    table::read_track_csv,
    GpxDirectory, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "track-labeler")]
#[command(about = "Normalize GPX tracks and label raw points against cleaned tracks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with pipeline configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Root directory holding track directories (overrides config)
    #[arg(long, global = true)]
    tracks_dir: Option<PathBuf>,

    /// Directory for CSV output (overrides config)
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a multi-file track and write it as a normalized CSV table
    Normalize {
        /// Directory under the tracks root
        dir: String,

        /// GPX file names without extension, in chronological order
        #[arg(required = true)]
        files: Vec<String>,

        /// Also export top-level waypoints
        #[arg(short, long)]
        waypoints: bool,
    },

    /// Label every raw point by whether it survived in the cleaned track
    Label {
        /// Directory with raw recordings
        raw_dir: String,

        /// Directory with manually cleaned recordings
        clean_dir: String,

        /// GPX file names without extension, shared by both directories
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Rebuild a GPX document from a normalized CSV table
    Invert {
        /// Normalized CSV table (lat/lon in radians, date)
        input: PathBuf,

        /// Destination GPX file
        output: PathBuf,

        /// Name written into the document and its track
        #[arg(short, long, default_value = "tmp_name")]
        name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(tracks_dir) = cli.tracks_dir {
        config.tracks_dir = tracks_dir;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }

    match cli.command {
        Commands::Normalize { dir, files, waypoints } => {
            config.parse_waypoints |= waypoints;
            run_normalize(&config, &dir, &files)
        }
        Commands::Label {
            raw_dir,
            clean_dir,
            files,
        } => run_label(&config, &raw_dir, &clean_dir, &files),
        Commands::Invert { input, output, name } => run_invert(&input, &output, &name),
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn run_normalize(config: &PipelineConfig, dir: &str, files: &[String]) -> Result<()> {
    let source = GpxDirectory::new(&config.tracks_dir);
    let assembled = read_track(&source, dir, files, config)
        .with_context(|| format!("failed to read track from {}", dir))?;
    let written = export_track(&assembled, &config.output_dir)?;
    println!(
        "{}: {} points -> {}",
        assembled.name(),
        assembled.track.len(),
        written[0].display()
    );
    Ok(())
}

fn run_label(config: &PipelineConfig, raw_dir: &str, clean_dir: &str, files: &[String]) -> Result<()> {
    let source = GpxDirectory::new(&config.tracks_dir);
    let pool = build_training_pool(&source, raw_dir, clean_dir, files, config)
        .with_context(|| format!("failed to label {} against {}", raw_dir, clean_dir))?;
    let path = export_training_pool(&pool, &config.output_dir)?;
    println!(
        "{}: {} points, {} kept, {} removed -> {}",
        pool.track_name,
        pool.summary.total,
        pool.summary.kept,
        pool.summary.removed,
        path.display()
    );
    Ok(())
}

fn run_invert(input: &Path, output: &Path, name: &str) -> Result<()> {
    let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let points = read_track_csv(BufReader::new(file))
        .with_context(|| format!("failed to read table {}", input.display()))?;
    info!("read {} rows from {}", points.len(), input.display());

    let options = InvertOptions {
        document_name: name.to_string(),
        track_name: name.to_string(),
    };
    write_gpx_file(output, &points, &options)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("{} points -> {}", points.len(), output.display());
    Ok(())
}
