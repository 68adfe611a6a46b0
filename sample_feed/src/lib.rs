//! `sample_feed` — Feed-side helpers: sample validation against scene
//! bounds and injectable ordered sample sources.

pub mod bounds;
pub mod error;
pub mod source;

pub use bounds::{FilterReport, Rejection, SampleBounds, SampleFilter};
pub use error::FeedError;
pub use source::{sort_by_sequence, JsonFileSource, MemorySource, SampleFile, SampleSource};
