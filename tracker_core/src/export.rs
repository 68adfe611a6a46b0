//! JSON export of reconstructed tracks for downstream tooling.

use crate::{scoring::TrackScore, track::Track, types::TrackId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedPosition {
    pub tick: u64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedTrack {
    pub track_id: TrackId,
    pub positions: Vec<ExportedPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<TrackScore>,
}

/// Export one track, collapsing runs of identical consecutive positions
/// into their first sample.
pub fn export_track(track: &Track, score: Option<&TrackScore>) -> ExportedTrack {
    let mut positions: Vec<ExportedPosition> = Vec::with_capacity(track.len());
    for s in track.samples() {
        let repeated = positions
            .last()
            .is_some_and(|p| p.x == s.x && p.y == s.y && p.z == s.z);
        if !repeated {
            positions.push(ExportedPosition {
                tick: s.sequence,
                x: s.x,
                y: s.y,
                z: s.z,
            });
        }
    }
    ExportedTrack {
        track_id: track.id(),
        positions,
        score: score.cloned(),
    }
}

pub fn to_json(tracks: &[ExportedTrack]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sample;

    #[test]
    fn repeated_positions_collapse() {
        let mut track = Track::new(TrackId(3), Sample::new(1, 1.0, 1.0, 0.0));
        track.push(Sample::new(2, 1.0, 1.0, 0.0));
        track.push(Sample::new(3, 2.0, 1.0, 0.0));
        track.push(Sample::new(4, 1.0, 1.0, 0.0));

        let out = export_track(&track, None);
        let ticks: Vec<u64> = out.positions.iter().map(|p| p.tick).collect();
        assert_eq!(ticks, vec![1, 3, 4]);

        let json = to_json(&[out]).unwrap();
        assert!(json.contains("\"track_id\": 3"));
        assert!(!json.contains("score"));
    }
}
