//! Injectable sample sources.
//!
//! A source yields one ordered, filtered sample sequence. Tracking code
//! takes the sequence as a parameter rather than collecting samples into
//! shared state from a reader callback.

use crate::{
    bounds::{FilterReport, SampleFilter},
    error::FeedError,
};
use serde::{Deserialize, Serialize};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracker_core::Sample;

/// Something that can produce an ordered, filtered sample sequence.
pub trait SampleSource {
    fn read_samples(&mut self) -> Result<(Vec<Sample>, FilterReport), FeedError>;
}

/// Stable sort by sequence number, for feeds that are orderable but not
/// delivered in order. Samples sharing a sequence keep their arrival order.
pub fn sort_by_sequence(samples: &mut [Sample]) {
    samples.sort_by_key(|s| s.sequence);
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Raw samples already in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    raw: Vec<Sample>,
    filter: SampleFilter,
}

impl MemorySource {
    pub fn new(raw: Vec<Sample>, filter: SampleFilter) -> Self {
        Self { raw, filter }
    }
}

impl SampleSource for MemorySource {
    fn read_samples(&mut self) -> Result<(Vec<Sample>, FilterReport), FeedError> {
        Ok(self.filter.apply(std::mem::take(&mut self.raw)))
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// Accepted sample file layouts: a bare array, or any object with a
/// `samples` array (such as a recorded simulation log).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleFile {
    Bare(Vec<Sample>),
    Wrapped { samples: Vec<Sample> },
}

impl SampleFile {
    pub fn into_samples(self) -> Vec<Sample> {
        match self {
            SampleFile::Bare(samples) => samples,
            SampleFile::Wrapped { samples } => samples,
        }
    }
}

/// Samples stored in a JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    path: PathBuf,
    filter: SampleFilter,
    sort: bool,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>, filter: SampleFilter) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            filter,
            sort: false,
        }
    }

    /// Sort by sequence after loading.
    pub fn sorted(mut self) -> Self {
        self.sort = true;
        self
    }
}

impl SampleSource for JsonFileSource {
    fn read_samples(&mut self) -> Result<(Vec<Sample>, FilterReport), FeedError> {
        let file = std::fs::File::open(&self.path).map_err(|source| FeedError::Io {
            path: self.path.clone(),
            source,
        })?;
        let parsed: SampleFile =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| FeedError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let mut raw = parsed.into_samples();
        if self.sort {
            sort_by_sequence(&mut raw);
        }
        Ok(self.filter.apply(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::SampleBounds;

    #[test]
    fn memory_source_filters() {
        let mut source = MemorySource::new(
            vec![Sample::new(1, 0.0, 0.0, 0.0), Sample::new(2, 500.0, 0.0, 0.0)],
            SampleFilter::new(SampleBounds::default()),
        );
        let (samples, report) = source.read_samples().unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(report.out_of_bounds, 1);
    }

    #[test]
    fn both_file_layouts_parse() {
        let bare: SampleFile =
            serde_json::from_str(r#"[{"sequence":1,"x":0.0,"y":0.0,"z":0.0}]"#).unwrap();
        assert_eq!(bare.into_samples().len(), 1);

        let wrapped: SampleFile = serde_json::from_str(
            r#"{"scenario_name":"s","samples":[{"sequence":1,"x":0.0,"y":0.0,"z":0.0,"label":3}]}"#,
        )
        .unwrap();
        let samples = wrapped.into_samples();
        assert_eq!(samples[0].label.map(|l| l.0), Some(3));
    }

    #[test]
    fn json_file_source_sorts_and_filters() {
        let path = std::env::temp_dir().join(format!("sample_feed_{}.json", std::process::id()));
        let raw = vec![
            Sample::new(3, 1.0, 0.0, 0.0),
            Sample::new(1, 0.0, 0.0, 0.0),
            Sample::new(2, 0.0, 250.0, 0.0),
        ];
        std::fs::write(&path, serde_json::to_string(&raw).unwrap()).unwrap();

        let mut source = JsonFileSource::new(&path, SampleFilter::default()).sorted();
        let (samples, report) = source.read_samples().unwrap();
        std::fs::remove_file(&path).ok();

        let seqs: Vec<u64> = samples.iter().map(|s| s.sequence).collect();
        assert_eq!(seqs, vec![1, 3]);
        assert_eq!(report.accepted, 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut source = JsonFileSource::new("/nonexistent/samples.json", SampleFilter::default());
        assert!(matches!(source.read_samples(), Err(FeedError::Io { .. })));
    }

    #[test]
    fn stable_sort_keeps_arrival_order_within_a_sequence() {
        let mut samples = vec![
            Sample::new(2, 0.0, 0.0, 0.0),
            Sample::new(1, 5.0, 0.0, 0.0),
            Sample::new(1, 6.0, 0.0, 0.0),
        ];
        sort_by_sequence(&mut samples);
        let xs: Vec<f64> = samples.iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![5.0, 6.0, 0.0]);
    }
}
