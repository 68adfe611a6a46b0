//! `tracker_core` — Multi-entity trajectory reconstruction from unlabelled
//! position samples.
//!
//! # Module layout
//! - [`types`]    — Fundamental types (IDs, samples)
//! - [`track`]    — Track struct and its cached terminal position
//! - [`gating`]   — Gate distance, nearest-within-gate rule, spatial grid
//! - [`tracker`]  — Greedy nearest-neighbour association pass
//! - [`store`]    — Finalized track collection
//! - [`scoring`]  — Path length, step stats, jumps, last significant move
//! - [`pipeline`] — Track + score orchestrator and its config
//! - [`analysis`] — Optional side labelling, event correlation, proximity
//! - [`metrics`]  — Purity / fragmentation against feed labels
//! - [`export`]   — JSON track export
//! - [`error`]    — Configuration errors

pub mod analysis;
pub mod error;
pub mod export;
pub mod gating;
pub mod metrics;
pub mod pipeline;
pub mod scoring;
pub mod store;
pub mod track;
pub mod tracker;
pub mod types;

pub use error::ConfigError;
pub use gating::GatingDims;
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput};
pub use scoring::{score_track, Scorer, ScoringConfig, TrackScore};
pub use store::TrackStore;
pub use track::Track;
pub use tracker::{build_tracks, Assignment, Tracker, TrackerConfig};
pub use types::{EntityLabel, Sample, TrackId};
