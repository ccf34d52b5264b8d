//! End-to-end flows built from the individual stages.
//!
//! Each flow runs in two phases: first a complete in-memory track is
//! assembled and its name derived, then any output is written. Nothing is
//! written while sources are still being read.

use log::info;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::assemble::{assemble_track, AssembledTrack};
use crate::error::Result;
use crate::fuse::{fuse_labels, FuseSummary};
use crate::source::TrackSource;
use crate::table;
use crate::{LabeledTrackPoint, PipelineConfig};

/// Labeled dataset produced from a raw/clean pair.
#[derive(Debug, Clone)]
pub struct TrainingPool {
    pub track_name: String,
    pub rows: Vec<LabeledTrackPoint>,
    pub summary: FuseSummary,
}

/// Assemble a track and derive its elapsed-seconds column.
pub fn read_track<S, F>(source: &S, dir: &str, files: &[F], config: &PipelineConfig) -> Result<AssembledTrack>
where
    S: TrackSource + ?Sized,
    F: AsRef<str>,
{
    let mut assembled = assemble_track(source, dir, files, config)?;
    assembled.track.derive_elapsed()?;
    Ok(assembled)
}

/// Read the raw and cleaned versions of a track and label every raw point.
///
/// Both directories must contain the same file identifiers. The pool is
/// named after the raw track. Only the raw track needs elapsed time; an
/// empty cleaned track labels every raw point as removed.
pub fn build_training_pool<S, F>(
    source: &S,
    raw_dir: &str,
    clean_dir: &str,
    files: &[F],
    config: &PipelineConfig,
) -> Result<TrainingPool>
where
    S: TrackSource + ?Sized,
    F: AsRef<str> + Sync,
{
    let config = &PipelineConfig {
        parse_waypoints: false,
        ..config.clone()
    };

    #[cfg(feature = "parallel")]
    let (raw, clean) = rayon::join(
        || read_track(source, raw_dir, files, config),
        || assemble_track(source, clean_dir, files, config),
    );

    #[cfg(not(feature = "parallel"))]
    let (raw, clean) = (
        read_track(source, raw_dir, files, config),
        assemble_track(source, clean_dir, files, config),
    );

    let (raw, clean) = (raw?.track, clean?.track);
    let rows = fuse_labels(&raw, &clean, config.quantization_scale);
    let summary = FuseSummary::from_labeled(&rows);
    info!(
        "training pool {:?}: {} rows, {:.1}% removed",
        raw.name,
        summary.total,
        summary.removed_ratio() * 100.0
    );

    Ok(TrainingPool {
        track_name: raw.name,
        rows,
        summary,
    })
}

// ============================================================================
// Output
// ============================================================================

/// Write `track_<name>.csv` and, when collected, `wpts_<name>.csv` into `output_dir`.
///
/// Returns the written paths, track table first.
pub fn export_track(assembled: &AssembledTrack, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    let track_path = output_dir.join(format!("track_{}.csv", assembled.name()));
    table::write_track_csv(BufWriter::new(File::create(&track_path)?), &assembled.track)?;
    written.push(track_path);

    if let Some(waypoints) = &assembled.waypoints {
        let wpts_path = output_dir.join(format!("wpts_{}.csv", assembled.name()));
        table::write_waypoints_csv(BufWriter::new(File::create(&wpts_path)?), waypoints)?;
        written.push(wpts_path);
    }

    for path in &written {
        info!("wrote {}", path.display());
    }
    Ok(written)
}

/// Write `labeled_<name>.csv` into `output_dir`.
pub fn export_training_pool(pool: &TrainingPool, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("labeled_{}.csv", pool.track_name));
    table::write_labeled_csv(BufWriter::new(File::create(&path)?), &pool.rows)?;
    info!("wrote {} labeled rows to {}", pool.rows.len(), path.display());
    Ok(path)
}
