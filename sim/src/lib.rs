//! `sim` — Scenario simulator: entity trajectories, noisy sample feeds, replay.

pub mod entity;
pub mod feed_sim;
pub mod replay;
pub mod scenarios;

pub use entity::{Entity, MotionSpec};
pub use feed_sim::{FeedParams, FeedSimulator};
pub use replay::{load_replay, save_replay, SampleLog};
pub use scenarios::{Scenario, ScenarioKind};
