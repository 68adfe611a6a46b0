//! Trajectory tracker: greedy gated nearest-neighbour association.
//!
//! # Association policy
//! - **Extend**: a sample joins the open track whose terminal position is
//!   nearest, provided that distance is within the gating distance `D`.
//!   Exact ties go to the earliest-created track.
//! - **Birth**: a sample with no track inside the gate opens a new track.
//! - Tracks are never closed, merged, or re-labelled, and a sample is never
//!   reassigned once appended.
//!
//! Each decision depends on every earlier one, so the pass is strictly
//! sequential. When two entities cross within `D` of each other the greedy
//! rule may swap their identities; that behaviour is kept as is.

use crate::{
    error::{require_positive, ConfigError},
    gating::{nearest_within_gate, GatingDims, SpatialGrid},
    store::TrackStore,
    track::Track,
    types::{Sample, TrackId},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Configuration for the association pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum distance at which a sample may extend an existing track.
    /// Typical values range from 1.5 (dense feeds) to 8.0.
    pub gating_distance: f64,
    /// Coordinates taking part in the gate distance
    pub gating_dims: GatingDims,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            gating_distance: 8.0,
            gating_dims: GatingDims::Horizontal,
        }
    }
}

impl TrackerConfig {
    /// Horizontal gating at the given distance.
    pub fn new(gating_distance: f64) -> Result<Self, ConfigError> {
        let config = Self {
            gating_distance,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("gating_distance", self.gating_distance)
    }
}

/// What happened to one pushed sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Assignment {
    /// Appended to an existing track at the given gate distance
    Extended { track: TrackId, distance: f64 },
    /// Opened a new track
    Opened(TrackId),
}

impl Assignment {
    pub fn track(&self) -> TrackId {
        match *self {
            Assignment::Extended { track, .. } => track,
            Assignment::Opened(track) => track,
        }
    }
}

/// Incremental form of the association pass.
///
/// Feed samples in order with [`Tracker::push`], then call
/// [`Tracker::finish`] to obtain the read-only store.
pub struct Tracker {
    config: TrackerConfig,
    tracks: Vec<Track>,
    grid: SpatialGrid,
    next_id: u64,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Caller guarantees `config.validate()` passed.
    pub(crate) fn from_valid(config: TrackerConfig) -> Self {
        let grid = SpatialGrid::for_gate(config.gating_distance);
        Self {
            config,
            tracks: Vec::new(),
            grid,
            next_id: 0,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Tracks built so far, in creation order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    fn next_track_id(&mut self) -> TrackId {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Assign one sample to a track.
    pub fn push(&mut self, sample: Sample) -> Assignment {
        let dims = self.config.gating_dims;
        let pos = sample.position();
        let tracks = &self.tracks;
        let nearest = nearest_within_gate(
            self.grid
                .query_nearby(sample.x, sample.y)
                .into_iter()
                .map(|ti| (ti, dims.distance(&tracks[ti].last_position(), &pos))),
            self.config.gating_distance,
        );

        match nearest {
            Some(m) => {
                let track = &mut self.tracks[m.track_idx];
                let from = (track.last_x(), track.last_y());
                track.push(sample);
                self.grid
                    .relocate(m.track_idx, from, (sample.x, sample.y));
                trace!(
                    seq = sample.sequence,
                    track = %track.id(),
                    distance = m.distance,
                    "extended track"
                );
                Assignment::Extended {
                    track: track.id(),
                    distance: m.distance,
                }
            }
            None => {
                let id = self.next_track_id();
                let idx = self.tracks.len();
                self.tracks.push(Track::new(id, sample));
                self.grid.insert(idx, sample.x, sample.y);
                trace!(seq = sample.sequence, track = %id, "opened track");
                Assignment::Opened(id)
            }
        }
    }

    /// Push every sample of an ordered sequence.
    pub fn push_all<I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = Sample>,
    {
        for sample in samples {
            self.push(sample);
        }
    }

    /// Finalize into a read-only store.
    pub fn finish(self) -> TrackStore {
        debug!(
            tracks = self.tracks.len(),
            samples = self.tracks.iter().map(Track::len).sum::<usize>(),
            gate = self.config.gating_distance,
            "association pass finished"
        );
        TrackStore::from_tracks(self.tracks)
    }
}

/// Partition an ordered sample sequence into tracks.
///
/// Holds no state between calls. An empty input yields an empty store.
pub fn build_tracks<I>(samples: I, config: &TrackerConfig) -> Result<TrackStore, ConfigError>
where
    I: IntoIterator<Item = Sample>,
{
    let mut tracker = Tracker::new(config.clone())?;
    tracker.push_all(samples);
    Ok(tracker.finish())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
