//! Track quality scoring: path length, step statistics, jumps, and the last
//! significant movement.
//!
//! Scores are a pure function of one finalized track and the thresholds, so
//! any subset of tracks can be scored independently.
//!
//! # Definitions
//! - **step**: horizontal distance between consecutive samples of a track
//! - **jump**: a step longer than `jump_threshold` (mis-association or a
//!   genuine teleport / respawn in the source)
//! - **significant movement**: 3D displacement above `movement_threshold`
//!   from a reference position that only advances when it is exceeded

use crate::{
    error::{require_positive, ConfigError},
    track::Track,
    types::TrackId,
};
use serde::{Deserialize, Serialize};

/// Thresholds used by the scorer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Steps above this horizontal distance count as jumps
    pub jump_threshold: f64,
    /// Displacements above this 3D distance count as real movement
    pub movement_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            jump_threshold: 5.0,
            movement_threshold: 0.5,
        }
    }
}

impl ScoringConfig {
    pub fn new(jump_threshold: f64, movement_threshold: f64) -> Result<Self, ConfigError> {
        let config = Self {
            jump_threshold,
            movement_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("jump_threshold", self.jump_threshold)?;
        require_positive("movement_threshold", self.movement_threshold)
    }
}

/// Distribution of horizontal step distances.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepStats {
    pub min: f64,
    pub median: f64,
    pub mean: f64,
    pub max: f64,
}

impl StepStats {
    fn from_steps(steps: &[f64]) -> Option<Self> {
        if steps.is_empty() {
            return None;
        }
        let mut sorted = steps.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        Some(Self {
            min: sorted[0],
            median,
            mean: steps.iter().sum::<f64>() / n as f64,
            max: sorted[n - 1],
        })
    }
}

/// One discontinuity along a track.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Jump {
    pub from_sequence: u64,
    pub to_sequence: u64,
    pub distance: f64,
}

/// Population standard deviation of the horizontal coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spread {
    pub x: f64,
    pub y: f64,
}

/// Derived movement statistics of one track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackScore {
    pub track_id: TrackId,
    pub position_count: usize,
    pub first_sequence: u64,
    pub last_sequence: u64,
    /// Sum of horizontal step distances
    pub path_length: f64,
    /// `None` for single-sample tracks
    pub step_stats: Option<StepStats>,
    pub jump_count: usize,
    pub jumps: Vec<Jump>,
    /// Jumps per step, 0 for single-sample tracks
    pub jump_rate: f64,
    pub last_significant_move_time: u64,
    pub position_spread: Spread,
}

/// A validated scorer. Thresholds are checked once, here, so no track is
/// ever scored against a non-positive or NaN threshold.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Caller guarantees `config.validate()` passed.
    pub(crate) fn from_valid(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, track: &Track) -> TrackScore {
        score_track(track, self)
    }
}

/// Running mean and squared deviation of one coordinate (Welford).
#[derive(Clone, Copy, Default)]
struct RunningSpread {
    n: f64,
    mean: f64,
    m2: f64,
}

impl RunningSpread {
    fn push(&mut self, value: f64) {
        self.n += 1.0;
        let delta = value - self.mean;
        self.mean += delta / self.n;
        self.m2 += delta * (value - self.mean);
    }

    /// Population standard deviation.
    fn std_dev(&self) -> f64 {
        if self.n == 0.0 {
            0.0
        } else {
            (self.m2 / self.n).max(0.0).sqrt()
        }
    }
}

/// Score one track in a single pass over its samples.
pub fn score_track(track: &Track, scorer: &Scorer) -> TrackScore {
    let config = scorer.config();
    let samples = track.samples();
    let first = track.first();

    let mut steps = Vec::with_capacity(samples.len().saturating_sub(1));
    let mut jumps = Vec::new();
    let mut reference = first;
    let mut last_significant_move_time = first.sequence;
    let (mut spread_x, mut spread_y) = (RunningSpread::default(), RunningSpread::default());

    for (i, sample) in samples.iter().enumerate() {
        spread_x.push(sample.x);
        spread_y.push(sample.y);
        if i == 0 {
            continue;
        }

        let prev = &samples[i - 1];
        let step = prev.horizontal_distance(sample);
        steps.push(step);
        if step > config.jump_threshold {
            jumps.push(Jump {
                from_sequence: prev.sequence,
                to_sequence: sample.sequence,
                distance: step,
            });
        }

        if reference.distance_3d(sample) > config.movement_threshold {
            reference = sample;
            last_significant_move_time = sample.sequence;
        }
    }

    TrackScore {
        track_id: track.id(),
        position_count: samples.len(),
        first_sequence: first.sequence,
        last_sequence: track.last().sequence,
        path_length: steps.iter().sum(),
        step_stats: StepStats::from_steps(&steps),
        jump_count: jumps.len(),
        jump_rate: if steps.is_empty() {
            0.0
        } else {
            jumps.len() as f64 / steps.len() as f64
        },
        jumps,
        last_significant_move_time,
        position_spread: Spread {
            x: spread_x.std_dev(),
            y: spread_y.std_dev(),
        },
    }
}

/// Horizontal distance travelled by steps ending at or before `cutoff`.
///
/// Used to measure movement during an early phase (e.g. a preparation
/// window at the start of a round).
pub fn path_length_until(track: &Track, cutoff: u64) -> f64 {
    track
        .steps()
        .take_while(|(_, to)| to.sequence <= cutoff)
        .map(|(from, to)| from.horizontal_distance(to))
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
