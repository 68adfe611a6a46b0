//! Pipeline orchestrator: one full reconstruction run over a sample sequence.
//!
//! # Processing steps
//! 1. Validate the configuration (fail fast, before any sample is read)
//! 2. Association pass (sequential, greedy gated nearest neighbour)
//! 3. Finalize the track store
//! 4. Score every track (parallel, one task per track)

use crate::{
    error::ConfigError,
    scoring::{Scorer, ScoringConfig, TrackScore},
    store::TrackStore,
    tracker::{Tracker, TrackerConfig},
    types::Sample,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Every recognized option of a reconstruction run.
///
/// Serialized flat: `gating_distance`, `gating_dims`, `jump_threshold`,
/// `movement_threshold`. Missing keys take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    #[serde(flatten)]
    pub tracker: TrackerConfig,
    #[serde(flatten)]
    pub scoring: ScoringConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tracker.validate()?;
        self.scoring.validate()
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

/// Outputs of one run.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineOutput {
    pub store: TrackStore,
    /// One score per track, in creation order
    pub scores: Vec<TrackScore>,
    /// Timings in microseconds
    pub timing_track_us: u64,
    pub timing_score_us: u64,
    pub total_time_us: u64,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// A validated reconstruction pipeline. Holds no state between runs.
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Track and score an ordered sample sequence.
    pub fn run<I>(&self, samples: I) -> PipelineOutput
    where
        I: IntoIterator<Item = Sample>,
    {
        let start_total = Instant::now();

        let t0 = Instant::now();
        let mut tracker = Tracker::from_valid(self.config.tracker.clone());
        tracker.push_all(samples);
        let store = tracker.finish();
        let timing_track_us = t0.elapsed().as_micros() as u64;

        let t0 = Instant::now();
        let scorer = Scorer::from_valid(self.config.scoring.clone());
        let scores = store.score_all(&scorer);
        let timing_score_us = t0.elapsed().as_micros() as u64;

        let total_time_us = start_total.elapsed().as_micros() as u64;
        debug!(
            tracks = store.len(),
            samples = store.sample_count(),
            timing_track_us,
            timing_score_us,
            "pipeline run complete"
        );

        PipelineOutput {
            store,
            scores,
            timing_track_us,
            timing_score_us,
            total_time_us,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
