//! Optional post-processing over a finalized store: side labelling by early
//! movement, event-time correlation, and proximity at a given tick.
//!
//! These heuristics carry domain assumptions (two sides, a preparation
//! phase where one side moves more, events that stop an entity) and are
//! never consulted by the tracker.

use crate::{
    scoring::{path_length_until, TrackScore},
    store::TrackStore,
    types::TrackId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Side labelling
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Attack,
    Defense,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Attack => write!(f, "ATK"),
            Side::Defense => write!(f, "DEF"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SideLabel {
    pub track_id: TrackId,
    /// Horizontal distance travelled up to the cutoff
    pub early_movement: f64,
    pub side: Side,
}

/// Rank tracks with at least `min_len` samples by movement up to `cutoff`
/// (most first) and label the first `defenders` as [`Side::Defense`], the
/// rest as [`Side::Attack`].
///
/// Defenders reinforce and roam during the preparation phase while
/// attackers sit in their spawn, which is what the ranking exploits.
pub fn label_sides_by_early_movement(
    store: &TrackStore,
    cutoff: u64,
    defenders: usize,
    min_len: usize,
) -> Vec<SideLabel> {
    let mut ranked: Vec<(TrackId, f64)> = store
        .iter()
        .filter(|t| t.len() >= min_len)
        .map(|t| (t.id(), path_length_until(t, cutoff)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .enumerate()
        .map(|(rank, (track_id, early_movement))| SideLabel {
            track_id,
            early_movement,
            side: if rank < defenders {
                Side::Defense
            } else {
                Side::Attack
            },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Event correlation
// ---------------------------------------------------------------------------

/// A track that stopped moving near an external event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventMatch {
    pub track_id: TrackId,
    pub last_significant_move_time: u64,
    /// |last significant move − event time|
    pub offset: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventCandidates {
    pub event_time: u64,
    /// Closest first, at most `top_k`
    pub candidates: Vec<EventMatch>,
}

/// For each event time (e.g. a death), list the tracks whose last
/// significant movement lies within `window` of it.
pub fn correlate_events(
    scores: &[TrackScore],
    event_times: &[u64],
    window: u64,
    top_k: usize,
) -> Vec<EventCandidates> {
    event_times
        .iter()
        .map(|&event_time| {
            let mut candidates: Vec<EventMatch> = scores
                .iter()
                .filter_map(|s| {
                    let offset = s.last_significant_move_time.abs_diff(event_time);
                    (offset <= window).then_some(EventMatch {
                        track_id: s.track_id,
                        last_significant_move_time: s.last_significant_move_time,
                        offset,
                    })
                })
                .collect();
            candidates.sort_by_key(|c| c.offset);
            candidates.truncate(top_k);
            EventCandidates {
                event_time,
                candidates,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Proximity
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackPair {
    pub a: TrackId,
    pub b: TrackId,
    /// Horizontal distance between the two tracks' positions
    pub distance: f64,
}

/// Pairwise horizontal distances between every two tracks that have started
/// by `sequence`, each at its latest position not after `sequence`.
/// Closest pair first.
pub fn closest_pairs_at(store: &TrackStore, sequence: u64) -> Vec<TrackPair> {
    let positioned: Vec<_> = store
        .iter()
        .filter_map(|t| t.position_at(sequence).map(|s| (t.id(), s)))
        .collect();

    let mut pairs = Vec::new();
    for (i, (a, sa)) in positioned.iter().enumerate() {
        for (b, sb) in &positioned[i + 1..] {
            pairs.push(TrackPair {
                a: *a,
                b: *b,
                distance: sa.horizontal_distance(sb),
            });
        }
    }
    pairs.sort_by(|p, q| p.distance.total_cmp(&q.distance));
    pairs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
