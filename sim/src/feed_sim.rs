//! Sample feed simulator.
//!
//! Generates the interleaved, unlabelled-in-practice packet stream a capture
//! decoder would produce:
//! - uniform positional jitter (larger vertically than horizontally)
//! - per-sample drop probability
//! - shuffled reporting order within a tick
//! - occasional garbage samples (NaN or far outside the scene), which the
//!   feed filter is expected to remove

use crate::entity::Entity;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracker_core::{EntityLabel, Sample};

/// Noise and loss characteristics of a simulated feed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedParams {
    /// Half-width of the uniform horizontal jitter
    pub jitter_xy: f64,
    /// Half-width of the uniform vertical jitter
    pub jitter_z: f64,
    /// Probability that an entity's sample is missing from a tick
    pub p_drop: f64,
    /// Probability that a tick carries one garbage sample
    pub p_garbage: f64,
    /// Shuffle the reporting order of entities within each tick
    pub shuffle: bool,
}

impl Default for FeedParams {
    fn default() -> Self {
        Self {
            jitter_xy: 0.02,
            jitter_z: 0.2,
            p_drop: 0.05,
            p_garbage: 0.01,
            shuffle: true,
        }
    }
}

/// Turns entity states into a sample stream.
pub struct FeedSimulator {
    pub params: FeedParams,
    rng: ChaCha8Rng,
    next_sequence: u64,
}

impl FeedSimulator {
    pub fn new(params: FeedParams, seed: u64) -> Self {
        Self {
            params,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_sequence: 0,
        }
    }

    fn jitter(&mut self, half_width: f64) -> f64 {
        if half_width <= 0.0 {
            0.0
        } else {
            self.rng.gen_range(-half_width..=half_width)
        }
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        seq
    }

    /// Samples for one tick at time `t`, each with its own packet sequence
    /// number. Samples carry the true entity label for evaluation.
    pub fn sample_tick(&mut self, entities: &[Entity], t: f64) -> Vec<Sample> {
        let mut order: Vec<usize> = (0..entities.len())
            .filter(|&i| entities[i].is_active(t))
            .collect();
        if self.params.shuffle {
            order.shuffle(&mut self.rng);
        }

        let mut samples = Vec::with_capacity(order.len() + 1);
        for i in order {
            if self.rng.gen::<f64>() < self.params.p_drop {
                continue;
            }
            let e = &entities[i];
            let x = e.position[0] + self.jitter(self.params.jitter_xy);
            let y = e.position[1] + self.jitter(self.params.jitter_xy);
            let z = e.position[2] + self.jitter(self.params.jitter_z);
            let seq = self.next_seq();
            samples.push(Sample::new(seq, x, y, z).with_label(EntityLabel(e.id)));
        }

        if self.rng.gen::<f64>() < self.params.p_garbage {
            let seq = self.next_seq();
            let garbage = if self.rng.gen::<bool>() {
                Sample::new(seq, f64::NAN, 0.0, 0.0)
            } else {
                Sample::new(seq, self.rng.gen_range(1.0e3..1.0e6), 0.0, 0.0)
            };
            let at = self.rng.gen_range(0..=samples.len());
            samples.insert(at, garbage);
        }

        samples
    }
}
