//! Track store: the finalized, read-only output of the association pass.

use crate::{
    scoring::{Scorer, TrackScore},
    track::Track,
    types::{Sample, TrackId},
};
use rayon::prelude::*;
use serde::Serialize;

/// All tracks of one pass, in creation order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TrackStore {
    tracks: Vec<Track>,
}

impl TrackStore {
    pub(crate) fn from_tracks(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        // Ids are dense and assigned in creation order.
        usize::try_from(id.0)
            .ok()
            .and_then(|i| self.tracks.get(i))
            .filter(|t| t.id() == id)
    }

    /// Total number of samples across all tracks.
    pub fn sample_count(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }

    /// Every sample of every track, sorted by sequence. Samples sharing a
    /// sequence keep track order.
    pub fn flatten(&self) -> Vec<Sample> {
        let mut all: Vec<Sample> = self
            .tracks
            .iter()
            .flat_map(|t| t.samples().iter().copied())
            .collect();
        all.sort_by_key(|s| s.sequence);
        all
    }

    /// Tracks ordered by sample count, longest first. Equal lengths keep
    /// creation order.
    pub fn by_length(&self) -> Vec<&Track> {
        let mut sorted: Vec<&Track> = self.tracks.iter().collect();
        sorted.sort_by(|a, b| b.len().cmp(&a.len()));
        sorted
    }

    /// The `n` longest tracks holding at least `min_len` samples.
    pub fn top(&self, n: usize, min_len: usize) -> Vec<&Track> {
        self.by_length()
            .into_iter()
            .take_while(|t| t.len() >= min_len)
            .take(n)
            .collect()
    }

    /// Score every track. Tracks are independent, so scoring runs in
    /// parallel; results come back in creation order.
    pub fn score_all(&self, scorer: &Scorer) -> Vec<TrackScore> {
        self.tracks
            .par_iter()
            .map(|track| scorer.score(track))
            .collect()
    }
}

impl<'a> IntoIterator for &'a TrackStore {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{build_tracks, TrackerConfig};

    fn store() -> TrackStore {
        // T0: 2 samples, T1: 3 samples, T2: 1 sample
        let input = vec![
            Sample::new(1, 0.0, 0.0, 0.0),
            Sample::new(2, 40.0, 40.0, 0.0),
            Sample::new(3, 1.0, 0.0, 0.0),
            Sample::new(4, 41.0, 40.0, 0.0),
            Sample::new(5, -60.0, 10.0, 0.0),
            Sample::new(6, 42.0, 40.0, 0.0),
        ];
        build_tracks(input, &TrackerConfig::new(3.0).unwrap()).unwrap()
    }

    #[test]
    fn flatten_restores_input_order() {
        let s = store();
        let seqs: Vec<u64> = s.flatten().iter().map(|s| s.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(s.sample_count(), 6);
    }

    #[test]
    fn length_ordering_and_top_n() {
        let s = store();
        let ids: Vec<TrackId> = s.by_length().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![TrackId(1), TrackId(0), TrackId(2)]);

        let top: Vec<TrackId> = s.top(5, 2).iter().map(|t| t.id()).collect();
        assert_eq!(top, vec![TrackId(1), TrackId(0)]);
        assert_eq!(s.top(1, 1).len(), 1);
    }

    #[test]
    fn get_by_id() {
        let s = store();
        assert_eq!(s.get(TrackId(2)).map(Track::len), Some(1));
        assert!(s.get(TrackId(9)).is_none());
    }

    #[test]
    fn scores_follow_creation_order() {
        let s = store();
        let scores = s.score_all(&Scorer::default());
        let ids: Vec<TrackId> = scores.iter().map(|sc| sc.track_id).collect();
        assert_eq!(ids, vec![TrackId(0), TrackId(1), TrackId(2)]);
    }
}
