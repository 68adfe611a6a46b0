//! Track: an ordered sample list plus its cached terminal position.

use crate::types::{Sample, TrackId};
use nalgebra::Point3;
use serde::Serialize;

/// A single reconstructed entity trajectory.
///
/// A track is born with exactly one sample and only grows. The cached
/// `last_x` / `last_y` / `last_z` always mirror the most recently appended
/// sample, which is why the fields are private.
#[derive(Clone, Debug, Serialize)]
pub struct Track {
    id: TrackId,
    samples: Vec<Sample>,
    last_x: f64,
    last_y: f64,
    last_z: f64,
}

impl Track {
    /// Open a new track from its first sample.
    pub fn new(id: TrackId, first: Sample) -> Self {
        Self {
            id,
            samples: vec![first],
            last_x: first.x,
            last_y: first.y,
            last_z: first.z,
        }
    }

    /// Append a sample and refresh the cached terminal position.
    pub fn push(&mut self, sample: Sample) {
        self.last_x = sample.x;
        self.last_y = sample.y;
        self.last_z = sample.z;
        self.samples.push(sample);
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: a track cannot exist without its birth sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> &Sample {
        &self.samples[0]
    }

    pub fn last(&self) -> &Sample {
        &self.samples[self.samples.len() - 1]
    }

    pub fn last_x(&self) -> f64 {
        self.last_x
    }

    pub fn last_y(&self) -> f64 {
        self.last_y
    }

    pub fn last_position(&self) -> Point3<f64> {
        Point3::new(self.last_x, self.last_y, self.last_z)
    }

    /// Consecutive sample pairs, in order.
    pub fn steps(&self) -> impl Iterator<Item = (&Sample, &Sample)> + '_ {
        self.samples.windows(2).map(|w| (&w[0], &w[1]))
    }

    /// Latest sample with `sequence <= at`, or `None` if the track had not
    /// started yet.
    pub fn position_at(&self, at: u64) -> Option<&Sample> {
        let idx = self.samples.partition_point(|s| s.sequence <= at);
        idx.checked_sub(1).map(|i| &self.samples[i])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn walk() -> Track {
        let mut track = Track::new(TrackId(0), Sample::new(10, 0.0, 0.0, 0.0));
        track.push(Sample::new(12, 1.0, 0.0, 0.0));
        track.push(Sample::new(15, 2.0, 1.0, 0.5));
        track
    }

    #[test]
    fn cached_position_follows_last_sample() {
        let track = walk();
        assert_eq!(track.len(), 3);
        assert_eq!(track.last_x(), track.last().x);
        assert_eq!(track.last_y(), track.last().y);
        assert_eq!(track.last_position().z, 0.5);
    }

    #[test]
    fn position_at_picks_latest_not_after() {
        let track = walk();
        assert!(track.position_at(9).is_none());
        assert_eq!(track.position_at(10).map(|s| s.sequence), Some(10));
        assert_eq!(track.position_at(14).map(|s| s.sequence), Some(12));
        assert_eq!(track.position_at(1000).map(|s| s.sequence), Some(15));
    }

    #[test]
    fn steps_pairs_neighbours() {
        let track = walk();
        let seqs: Vec<(u64, u64)> = track
            .steps()
            .map(|(a, b)| (a.sequence, b.sequence))
            .collect();
        assert_eq!(seqs, vec![(10, 12), (12, 15)]);
    }
}
