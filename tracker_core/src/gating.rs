//! Distance gating: decides whether a sample is "close enough" to the
//! terminal position of an open track to extend it.
//!
//! # Gating criterion
//! d(s, track) = ‖s − last(track)‖ over the configured dimensions
//!
//! Accept if d ≤ D. Among accepted tracks the strictly smallest distance
//! wins; exact ties go to the earliest-created track.
//!
//! z is excluded from the default horizontal gate because vertical noise is
//! large relative to the horizontal movement granularity.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which coordinates take part in the gate distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatingDims {
    /// x / y only
    #[default]
    Horizontal,
    /// x / y / z
    Full,
}

impl GatingDims {
    /// Gate distance between two positions.
    pub fn distance(self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        let d = a - b;
        match self {
            GatingDims::Horizontal => d.xy().norm(),
            GatingDims::Full => d.norm(),
        }
    }
}

/// A Uniform Grid spatial index over track terminal positions (x/y).
///
/// Cells are twice the gate wide, so every track within the gate of a query
/// point sits in the query cell or one of its 8 neighbours, with margin to
/// spare against rounding in the cell computation. Both gating modes are
/// covered since a 3D distance ≤ D implies a horizontal one ≤ D.
pub struct SpatialGrid {
    cell_size: f64,
    /// Maps cell key (ix, iy) to the track indices whose terminal sits there.
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialGrid {
    pub fn for_gate(gate: f64) -> Self {
        Self {
            cell_size: 2.0 * gate,
            cells: HashMap::new(),
        }
    }

    fn cell_of(&self, x: f64, y: f64) -> (i64, i64) {
        // Float-to-int `as` saturates, so huge quotients collapse onto the
        // edge cells instead of wrapping.
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    /// Insert a track index at position (x, y).
    pub fn insert(&mut self, idx: usize, x: f64, y: f64) {
        let key = self.cell_of(x, y);
        self.cells.entry(key).or_default().push(idx);
    }

    /// Remove a track index previously inserted at (x, y).
    pub fn remove(&mut self, idx: usize, x: f64, y: f64) {
        let key = self.cell_of(x, y);
        if let Some(indices) = self.cells.get_mut(&key) {
            if let Some(pos) = indices.iter().position(|&i| i == idx) {
                indices.swap_remove(pos);
            }
            if indices.is_empty() {
                self.cells.remove(&key);
            }
        }
    }

    /// Move a track index from one position to another.
    pub fn relocate(&mut self, idx: usize, from: (f64, f64), to: (f64, f64)) {
        if self.cell_of(from.0, from.1) == self.cell_of(to.0, to.1) {
            return;
        }
        self.remove(idx, from.0, from.1);
        self.insert(idx, to.0, to.1);
    }

    /// Track indices in the 3×3 block of cells around (x, y), ascending and
    /// without duplicates.
    pub fn query_nearby(&self, x: f64, y: f64) -> Vec<usize> {
        let (ix, iy) = self.cell_of(x, y);

        let mut results = Vec::new();
        let mut visited: Vec<(i64, i64)> = Vec::with_capacity(9);
        for dx in -1..=1i64 {
            for dy in -1..=1i64 {
                let key = (ix.saturating_add(dx), iy.saturating_add(dy));
                // Saturated keys can repeat at the edges of the i64 range.
                if visited.contains(&key) {
                    continue;
                }
                visited.push(key);
                if let Some(indices) = self.cells.get(&key) {
                    results.extend_from_slice(indices);
                }
            }
        }
        results.sort_unstable();
        results
    }
}

/// The winning candidate of a gate check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GateMatch {
    pub track_idx: usize,
    pub distance: f64,
}

/// Pick the nearest candidate within `gate`.
///
/// `candidates` must be ordered by ascending track index: only a strictly
/// smaller distance displaces the current best, which makes the earliest
/// track win exact ties. NaN distances never pass.
pub fn nearest_within_gate<I>(candidates: I, gate: f64) -> Option<GateMatch>
where
    I: IntoIterator<Item = (usize, f64)>,
{
    let mut best: Option<GateMatch> = None;
    for (track_idx, distance) in candidates {
        if !(distance <= gate) {
            continue;
        }
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(GateMatch {
                track_idx,
                distance,
            });
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
