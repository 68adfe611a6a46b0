//! Recorded feeds: serialize/deserialize simulated sample logs for offline
//! tracking runs.
//!
//! The log is a JSON object with a `samples` array, so `sample_feed` reads
//! it back as a wrapped sample file.

use crate::scenarios::Scenario;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracker_core::Sample;

/// A full recorded simulation log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SampleLog {
    pub scenario_name: String,
    pub seed: u64,
    pub sim_dt: f64,
    pub duration: f64,
    /// End of the preparation phase, if the scenario has one (s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_end: Option<f64>,
    /// Raw samples in emission order, garbage included
    pub samples: Vec<Sample>,
}

impl SampleLog {
    pub fn new(scenario: &Scenario, samples: Vec<Sample>) -> Self {
        Self {
            scenario_name: scenario.name.clone(),
            seed: scenario.seed,
            sim_dt: scenario.sim_dt,
            duration: scenario.duration,
            prep_end: scenario.prep_end,
            samples,
        }
    }

    /// Last sequence number emitted before `t` seconds into the run, for
    /// converting phase boundaries into cutoffs.
    pub fn sequence_at(&self, t: f64) -> Option<u64> {
        let ticks = (t / self.sim_dt).floor().max(0.0) as u64;
        let per_tick = self.samples.len() as f64 / (self.duration / self.sim_dt).ceil().max(1.0);
        let index = ((ticks as f64) * per_tick) as usize;
        self.samples
            .get(..index.min(self.samples.len()))
            .and_then(|head| head.iter().map(|s| s.sequence).max())
    }
}

/// Save a sample log to a JSON file.
pub fn save_replay(log: &SampleLog, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, log)?;
    Ok(())
}

/// Load a sample log from a JSON file.
pub fn load_replay(path: &Path) -> anyhow::Result<SampleLog> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let log: SampleLog = serde_json::from_reader(reader)?;
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::ScenarioKind;
    use sample_feed::{JsonFileSource, SampleFilter, SampleSource};

    #[test]
    fn saved_log_reads_back_as_a_sample_file() {
        let mut scenario = Scenario::build(ScenarioKind::Crossing, 5);
        let samples = scenario.simulate();
        let log = SampleLog::new(&scenario, samples.clone());

        let path = std::env::temp_dir().join(format!("sim_replay_{}.json", std::process::id()));
        save_replay(&log, &path).unwrap();

        let loaded = load_replay(&path).unwrap();
        assert_eq!(loaded.scenario_name, "Crossing");
        assert_eq!(loaded.samples.len(), samples.len());

        let (read, report) = JsonFileSource::new(&path, SampleFilter::default())
            .read_samples()
            .unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(read.len(), report.accepted);
        assert_eq!(read.len(), samples.len());
    }

    #[test]
    fn sequence_at_is_monotonic() {
        let mut scenario = Scenario::build(ScenarioKind::Simple, 0);
        let samples = scenario.simulate();
        let log = SampleLog::new(&scenario, samples);
        assert_eq!(log.sequence_at(0.0), None);
        let early = log.sequence_at(5.0).unwrap();
        let late = log.sequence_at(15.0).unwrap();
        assert!(early < late);
        // Two entities, no drops: ten seconds is about 200 samples.
        assert!((190..=210).contains(&(late - early)));
    }
}
