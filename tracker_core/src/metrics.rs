//! Association metrics against feed labels: purity, fragmentation, label
//! switches.
//!
//! Only meaningful for feeds whose labels are trustworthy (e.g. simulated
//! ground truth). Unlabelled samples are ignored.

use crate::{
    store::TrackStore,
    track::Track,
    types::{EntityLabel, TrackId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label composition of one track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackPurity {
    pub track_id: TrackId,
    /// Most frequent label; ties go to the smallest label
    pub majority_label: Option<EntityLabel>,
    /// Labelled samples carrying the majority label / labelled samples
    pub purity: f64,
    /// Number of labelled samples
    pub labelled: usize,
    /// Label changes between consecutive labelled samples
    pub label_switches: usize,
}

impl TrackPurity {
    pub fn evaluate(track: &Track) -> Self {
        let mut counts: BTreeMap<EntityLabel, usize> = BTreeMap::new();
        let mut label_switches = 0;
        let mut prev: Option<EntityLabel> = None;

        for label in track.samples().iter().filter_map(|s| s.label) {
            *counts.entry(label).or_default() += 1;
            if prev.is_some_and(|p| p != label) {
                label_switches += 1;
            }
            prev = Some(label);
        }

        let labelled: usize = counts.values().sum();
        let majority = counts
            .iter()
            .fold(None, |best: Option<(EntityLabel, usize)>, (&label, &n)| match best {
                Some((_, bn)) if bn >= n => best,
                _ => Some((label, n)),
            });

        Self {
            track_id: track.id(),
            majority_label: majority.map(|(label, _)| label),
            purity: match majority {
                Some((_, n)) => n as f64 / labelled as f64,
                None => 1.0,
            },
            labelled,
            label_switches,
        }
    }
}

/// Accumulated association statistics over a whole store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AssociationMetrics {
    pub n_tracks: usize,
    /// Distinct labels seen
    pub n_labels: usize,
    pub n_labelled: usize,
    /// Labelled samples agreeing with their track's majority / all labelled
    pub purity: f64,
    /// Tracks per label, counting each track under its majority label
    pub fragmentation: f64,
    pub label_switches: usize,
    pub per_track: Vec<TrackPurity>,
}

impl AssociationMetrics {
    pub fn evaluate(store: &TrackStore) -> Self {
        let per_track: Vec<TrackPurity> = store.iter().map(TrackPurity::evaluate).collect();

        let mut labels: BTreeMap<EntityLabel, usize> = BTreeMap::new();
        for sample in store.iter().flat_map(|t| t.samples()) {
            if let Some(label) = sample.label {
                *labels.entry(label).or_default() += 1;
            }
        }

        let n_labelled: usize = per_track.iter().map(|p| p.labelled).sum();
        let agreeing: f64 = per_track
            .iter()
            .map(|p| p.purity * p.labelled as f64)
            .sum();
        let owning_tracks = per_track
            .iter()
            .filter(|p| p.majority_label.is_some())
            .count();

        Self {
            n_tracks: store.len(),
            n_labels: labels.len(),
            n_labelled,
            purity: if n_labelled == 0 {
                1.0
            } else {
                agreeing / n_labelled as f64
            },
            fragmentation: if labels.is_empty() {
                0.0
            } else {
                owning_tracks as f64 / labels.len() as f64
            },
            label_switches: per_track.iter().map(|p| p.label_switches).sum(),
            per_track,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
