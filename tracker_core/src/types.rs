//! Fundamental types used across the entire workspace.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identifier types: newtype wrappers so IDs are never confused at compile time
// ---------------------------------------------------------------------------

/// Track identifier, assigned in creation order starting at 0.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TrackId(pub u64);

/// Entity label carried by some feeds. Unreliable: never used for grouping,
/// only for evaluating association quality after the fact.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityLabel(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// A single timestamped 3D position observation.
///
/// Samples reaching the tracker are assumed finite and within the scene
/// bounds; the feed is responsible for filtering them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Monotonic per-feed tick or packet index
    pub sequence: u64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Weak label, if the feed has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<EntityLabel>,
}

impl Sample {
    pub fn new(sequence: u64, x: f64, y: f64, z: f64) -> Self {
        Self {
            sequence,
            x,
            y,
            z,
            label: None,
        }
    }

    pub fn with_label(mut self, label: EntityLabel) -> Self {
        self.label = Some(label);
        self
    }

    pub fn position(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    /// Euclidean distance in the x/y plane.
    pub fn horizontal_distance(&self, other: &Sample) -> f64 {
        (self.position() - other.position()).xy().norm()
    }

    /// Full 3D Euclidean distance.
    pub fn distance_3d(&self, other: &Sample) -> f64 {
        (self.position() - other.position()).norm()
    }

    /// True when all coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}
