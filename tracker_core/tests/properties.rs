use proptest::prelude::*;
use std::collections::HashSet;
use tracker_core::{
    build_tracks, score_track, Assignment, GatingDims, Sample, Scorer, TrackId, Tracker,
    TrackerConfig,
};

/// Samples on a 0.1 grid inside ±100 horizontally, one per sequence number.
fn sample_stream() -> impl Strategy<Value = Vec<Sample>> {
    prop::collection::vec((-1000i32..=1000, -1000i32..=1000, -50i32..=50), 0..150).prop_map(
        |points| {
            points
                .into_iter()
                .enumerate()
                .map(|(i, (x, y, z))| {
                    Sample::new(i as u64, x as f64 / 10.0, y as f64 / 10.0, z as f64 / 10.0)
                })
                .collect()
        },
    )
}

fn gate() -> impl Strategy<Value = f64> {
    prop_oneof![Just(1.5), Just(5.0), Just(8.0), 0.1f64..40.0]
}

/// Brute-force reference: scan every track, strictly smaller wins.
fn reference_choice(tracker: &Tracker, sample: &Sample, dims: GatingDims, d: f64) -> Option<TrackId> {
    let mut best: Option<(TrackId, f64)> = None;
    for track in tracker.tracks() {
        let dist = dims.distance(&track.last_position(), &sample.position());
        if dist <= d && best.map_or(true, |(_, b)| dist < b) {
            best = Some((track.id(), dist));
        }
    }
    best.map(|(id, _)| id)
}

proptest! {
    #[test]
    fn every_sample_lands_in_exactly_one_track(samples in sample_stream(), d in gate()) {
        let store = build_tracks(samples.clone(), &TrackerConfig::new(d).unwrap()).unwrap();
        prop_assert_eq!(store.sample_count(), samples.len());
        prop_assert_eq!(store.flatten(), samples.clone());

        if samples.is_empty() {
            prop_assert!(store.is_empty());
        } else {
            prop_assert!(store.len() >= 1 && store.len() <= samples.len());
        }
        for track in &store {
            prop_assert!(track.samples().windows(2).all(|w| w[0].sequence < w[1].sequence));
        }
    }

    #[test]
    fn identical_runs_give_identical_partitions(samples in sample_stream(), d in gate()) {
        let cfg = TrackerConfig::new(d).unwrap();
        let a = build_tracks(samples.clone(), &cfg).unwrap();
        let b = build_tracks(samples, &cfg).unwrap();
        prop_assert_eq!(a.len(), b.len());
        for (ta, tb) in a.iter().zip(b.iter()) {
            prop_assert_eq!(ta.id(), tb.id());
            prop_assert_eq!(ta.samples(), tb.samples());
        }
    }

    #[test]
    fn assignments_match_brute_force_gating(
        samples in sample_stream(),
        d in gate(),
        full in any::<bool>(),
    ) {
        let dims = if full { GatingDims::Full } else { GatingDims::Horizontal };
        let mut tracker = Tracker::new(TrackerConfig { gating_distance: d, gating_dims: dims }).unwrap();
        for sample in samples {
            let expected = reference_choice(&tracker, &sample, dims, d);
            match tracker.push(sample) {
                Assignment::Extended { track, distance } => {
                    prop_assert_eq!(Some(track), expected);
                    prop_assert!(distance <= d);
                }
                Assignment::Opened(_) => prop_assert_eq!(expected, None),
            }
        }

        let store = tracker.finish();
        for track in &store {
            for (a, b) in track.steps() {
                prop_assert!(dims.distance(&a.position(), &b.position()) <= d);
            }
        }
    }

    #[test]
    fn tiny_gate_splits_by_position(samples in sample_stream()) {
        let store = build_tracks(samples.clone(), &TrackerConfig::new(1e-9).unwrap()).unwrap();
        let distinct: HashSet<(i64, i64)> = samples
            .iter()
            .map(|s| ((s.x * 10.0).round() as i64, (s.y * 10.0).round() as i64))
            .collect();
        prop_assert_eq!(store.len(), distinct.len());
    }

    #[test]
    fn infinite_gate_gives_one_track(samples in sample_stream()) {
        let store = build_tracks(samples.clone(), &TrackerConfig::new(f64::INFINITY).unwrap()).unwrap();
        prop_assert_eq!(store.len(), usize::from(!samples.is_empty()));
    }

    #[test]
    fn scoring_is_pure(samples in sample_stream(), d in gate()) {
        let store = build_tracks(samples, &TrackerConfig::new(d).unwrap()).unwrap();
        let scorer = Scorer::default();
        for track in &store {
            let first = score_track(track, &scorer);
            let second = score_track(track, &scorer);
            prop_assert_eq!(first.path_length.to_bits(), second.path_length.to_bits());
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.position_count, track.len());
            prop_assert!(first.jump_count < track.len());
        }
        prop_assert_eq!(store.score_all(&scorer).len(), store.len());
    }
}
