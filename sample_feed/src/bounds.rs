//! Scene bounds and the sample filter applied before tracking.
//!
//! # Acceptance rule
//! A raw sample passes iff x, y, z are finite, |x| ≤ horizontal,
//! |y| ≤ horizontal and |z| ≤ vertical. The bounds are scene-specific.

use crate::error::FeedError;
use serde::{Deserialize, Serialize};
use tracing::warn;
use tracker_core::Sample;

/// Coordinate limits of one scene, symmetric around the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleBounds {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Default for SampleBounds {
    fn default() -> Self {
        Self {
            horizontal: 100.0,
            vertical: 100.0,
        }
    }
}

impl SampleBounds {
    pub fn new(horizontal: f64, vertical: f64) -> Result<Self, FeedError> {
        let bounds = Self {
            horizontal,
            vertical,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Reject zero, negative and NaN extents. Infinity disables the limit.
    pub fn validate(&self) -> Result<(), FeedError> {
        for (name, value) in [("horizontal", self.horizontal), ("vertical", self.vertical)] {
            if !(value > 0.0) {
                return Err(FeedError::InvalidBounds { name, value });
            }
        }
        Ok(())
    }

    pub fn contains(&self, s: &Sample) -> bool {
        s.x.abs() <= self.horizontal && s.y.abs() <= self.horizontal && s.z.abs() <= self.vertical
    }
}

/// Why a raw sample was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    NonFinite,
    OutOfBounds,
}

/// Counts of what the filter kept and dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReport {
    pub accepted: usize,
    pub non_finite: usize,
    pub out_of_bounds: usize,
}

impl FilterReport {
    pub fn rejected(&self) -> usize {
        self.non_finite + self.out_of_bounds
    }
}

/// Drops samples the tracker must never see.
#[derive(Clone, Copy, Debug, Default)]
pub struct SampleFilter {
    pub bounds: SampleBounds,
}

impl SampleFilter {
    pub fn new(bounds: SampleBounds) -> Self {
        Self { bounds }
    }

    pub fn check(&self, s: &Sample) -> Result<(), Rejection> {
        if !s.is_finite() {
            Err(Rejection::NonFinite)
        } else if !self.bounds.contains(s) {
            Err(Rejection::OutOfBounds)
        } else {
            Ok(())
        }
    }

    /// Keep the valid samples, in order.
    pub fn apply<I>(&self, raw: I) -> (Vec<Sample>, FilterReport)
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut report = FilterReport::default();
        let kept: Vec<Sample> = raw
            .into_iter()
            .filter(|s| match self.check(s) {
                Ok(()) => {
                    report.accepted += 1;
                    true
                }
                Err(Rejection::NonFinite) => {
                    report.non_finite += 1;
                    false
                }
                Err(Rejection::OutOfBounds) => {
                    report.out_of_bounds += 1;
                    false
                }
            })
            .collect();

        if report.rejected() > 0 {
            warn!(
                non_finite = report.non_finite,
                out_of_bounds = report.out_of_bounds,
                accepted = report.accepted,
                "dropped invalid samples"
            );
        }
        (kept, report)
    }
}
