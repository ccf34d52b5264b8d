//! Track assembly across segments and files.
//!
//! Files are appended in the order given, segments in document order, points
//! in segment order. Callers supply files chronologically; out-of-order input
//! yields an out-of-order track without error.

use log::{debug, info, warn};

use crate::error::{Result, TrackError};
use crate::geo_utils::make_relevant_name;
use crate::normalize::{normalize_point, normalize_waypoint};
use crate::source::TrackSource;
use crate::{PipelineConfig, Track, Waypoint};

/// A track assembled from one or more source files.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledTrack {
    pub track: Track,
    /// Present only when waypoint parsing is enabled.
    pub waypoints: Option<Vec<Waypoint>>,
}

impl AssembledTrack {
    /// Sanitized name shared by every output derived from this track.
    pub fn name(&self) -> &str {
        &self.track.name
    }
}

/// Assemble one logical track from `files` inside `dir`.
///
/// The track name comes from the first file only. If it declares none, the
/// sanitized first file identifier is used instead. Any malformed point
/// aborts the whole track.
pub fn assemble_track<S, F>(
    source: &S,
    dir: &str,
    files: &[F],
    config: &PipelineConfig,
) -> Result<AssembledTrack>
where
    S: TrackSource + ?Sized,
    F: AsRef<str>,
{
    let first = files.first().ok_or_else(|| TrackError::SourceRead {
        path: dir.into(),
        reason: "no source files given".to_string(),
    })?;

    let mut name: Option<String> = None;
    let mut points = Vec::new();
    let mut waypoints = config.parse_waypoints.then(Vec::new);

    for file in files {
        let file = file.as_ref();
        let document = source.load(dir, file)?;

        if name.is_none() {
            name = Some(match document.track_name.as_deref() {
                Some(declared) => make_relevant_name(declared),
                None => {
                    warn!(
                        "{}/{} declares no track name, naming track after the file",
                        dir, file
                    );
                    make_relevant_name(first.as_ref())
                }
            });
        }

        for (index, segment) in document.segments.iter().enumerate() {
            debug!("{}/{} segment {}: {} points", dir, file, index, segment.len());
            for raw in segment {
                points.push(normalize_point(raw, file)?);
            }
        }

        if let Some(collected) = waypoints.as_mut() {
            for raw in &document.waypoints {
                collected.push(normalize_waypoint(raw, &config.waypoint_placeholder, file)?);
            }
        }
    }

    let name = name.unwrap_or_default();
    info!(
        "assembled track {:?} from {} file(s) in {}: {} points",
        name,
        files.len(),
        dir,
        points.len()
    );

    Ok(AssembledTrack {
        track: Track::new(name, points),
        waypoints,
    })
}
