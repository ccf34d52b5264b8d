//! Label fusion between a raw track and its manually cleaned copy.
//!
//! Points are matched purely by [`QuantizedCoordinateKey`]. Presence in the
//! cleaned track is the only positive signal: every raw point whose key is
//! found there is [`Label::Kept`], everything else is [`Label::Removed`].
//! There is no spatial tolerance or nearest-neighbour fallback, so a genuine
//! duplicate whose coordinates differ after quantization is silently labeled
//! as removed.

use log::{debug, info};
use std::collections::HashMap;

use crate::geo_utils::QuantizedCoordinateKey;
use crate::{Label, LabeledTrackPoint, Track, TrackPoint};

/// Label counts of a fused track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FuseSummary {
    pub total: usize,
    pub kept: usize,
    pub removed: usize,
}

impl FuseSummary {
    pub fn from_labeled(labeled: &[LabeledTrackPoint]) -> Self {
        let removed = labeled.iter().filter(|p| p.label == Label::Removed).count();
        Self {
            total: labeled.len(),
            kept: labeled.len() - removed,
            removed,
        }
    }

    /// Fraction of points labeled as removed, 0.0 for an empty track.
    pub fn removed_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.removed as f64 / self.total as f64
        }
    }
}

/// Label every raw point against the cleaned track.
///
/// Output has the same length and order as `raw` and carries its elapsed
/// seconds when they were derived. Duplicate keys in `clean` keep the first
/// occurrence only.
pub fn fuse_labels(raw: &Track, clean: &Track, scale: f64) -> Vec<LabeledTrackPoint> {
    let mut lookup: HashMap<QuantizedCoordinateKey, Label> = HashMap::with_capacity(clean.len());
    for key in compute_keys(&clean.points, scale) {
        lookup.entry(key).or_insert(Label::Kept);
    }
    debug!(
        "clean track {:?}: {} points, {} distinct keys",
        clean.name,
        clean.len(),
        lookup.len()
    );

    let labeled: Vec<LabeledTrackPoint> = compute_keys(&raw.points, scale)
        .into_iter()
        .zip(&raw.points)
        .enumerate()
        .map(|(i, (key, point))| LabeledTrackPoint {
            point: *point,
            sec_from_start: raw.elapsed_seconds.as_ref().and_then(|e| e.get(i).copied()),
            label: lookup.get(&key).copied().unwrap_or(Label::Removed),
        })
        .collect();

    let summary = FuseSummary::from_labeled(&labeled);
    info!(
        "fused {:?}: {} kept, {} removed of {}",
        raw.name, summary.kept, summary.removed, summary.total
    );
    labeled
}

#[cfg(feature = "parallel")]
fn compute_keys(points: &[TrackPoint], scale: f64) -> Vec<QuantizedCoordinateKey> {
    use rayon::prelude::*;
    points.par_iter().map(|p| p.key(scale)).collect()
}

#[cfg(not(feature = "parallel"))]
fn compute_keys(points: &[TrackPoint], scale: f64) -> Vec<QuantizedCoordinateKey> {
    points.iter().map(|p| p.key(scale)).collect()
}
