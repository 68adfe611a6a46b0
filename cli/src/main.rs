//! `trajtrack` CLI: scenario runs, offline tracking of recorded sample logs,
//! track export.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sample_feed::{JsonFileSource, MemorySource, SampleBounds, SampleFilter, SampleSource};
use sim::replay::{save_replay, SampleLog};
use sim::scenarios::{Scenario, ScenarioKind};
use std::path::{Path, PathBuf};
use tracing::info;
use tracker_core::analysis::label_sides_by_early_movement;
use tracker_core::export::{export_track, to_json};
use tracker_core::metrics::AssociationMetrics;
use tracker_core::{Pipeline, PipelineConfig, PipelineOutput, Sample, TrackScore};

#[derive(Parser)]
#[command(name = "trajtrack", about = "Trajectory reconstruction from unlabelled position samples")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a named scenario, track it and report association quality.
    RunScenario {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Pipeline config JSON (gating and scoring thresholds)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the gating distance
        #[arg(long)]
        gate: Option<f64>,
        /// Export the reconstructed tracks to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also save the raw sample log
        #[arg(long)]
        save_replay: Option<PathBuf>,
    },
    /// Track a recorded sample file (bare array or sample log).
    Track {
        /// Path to the sample JSON file
        input: PathBuf,
        /// Pipeline config JSON (gating and scoring thresholds)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the gating distance
        #[arg(long)]
        gate: Option<f64>,
        /// Ignore tracks shorter than this
        #[arg(long, default_value_t = 50)]
        min_len: usize,
        /// Number of longest tracks to report and export
        #[arg(long, default_value_t = 12)]
        top: usize,
        /// Horizontal scene half-extent
        #[arg(long, default_value_t = 100.0)]
        bounds: f64,
        /// Sort samples by sequence before tracking
        #[arg(long)]
        sort: bool,
        /// Export the reported tracks to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::RunScenario {
            scenario,
            seed,
            config,
            gate,
            output,
            save_replay: save_path,
        } => {
            let config = load_config(config.as_deref(), gate)?;
            run_scenario(scenario, seed, config, output.as_deref(), save_path.as_deref())?;
        }
        Commands::Track {
            input,
            config,
            gate,
            min_len,
            top,
            bounds,
            sort,
            output,
        } => {
            let config = load_config(config.as_deref(), gate)?;
            let bounds = SampleBounds::new(bounds, SampleBounds::default().vertical)
                .context("invalid --bounds")?;
            let filter = SampleFilter::new(bounds);
            let mut source = JsonFileSource::new(&input, filter);
            if sort {
                source = source.sorted();
            }
            run_track(&mut source, config, min_len, top, output.as_deref())?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>, gate: Option<f64>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("reading config {}", p.display()))?;
            PipelineConfig::from_json(&text)
                .with_context(|| format!("parsing config {}", p.display()))?
        }
        None => PipelineConfig::default(),
    };
    if let Some(d) = gate {
        config.tracker.gating_distance = d;
    }
    config.validate()?;
    Ok(config)
}

fn run_scenario(
    kind: ScenarioKind,
    seed: u64,
    config: PipelineConfig,
    output_path: Option<&Path>,
    replay_path: Option<&Path>,
) -> Result<()> {
    let mut scenario = Scenario::build(kind, seed);
    println!(
        "Running scenario '{}' (seed={}, duration={:.0}s, {} entities)...",
        scenario.name,
        seed,
        scenario.duration,
        scenario.entities.len()
    );

    let raw = scenario.simulate();
    let log = SampleLog::new(&scenario, raw.clone());

    if let Some(rpath) = replay_path {
        save_replay(&log, rpath)?;
        println!("Sample log saved to {}", rpath.display());
    }

    let (samples, report) = MemorySource::new(raw, SampleFilter::default()).read_samples()?;
    println!(
        "Feed: {} samples kept, {} non-finite, {} out of bounds",
        report.accepted, report.non_finite, report.out_of_bounds
    );

    let pipeline = Pipeline::new(config)?;
    let out = pipeline.run(samples);
    print_summary(&out);

    let metrics = AssociationMetrics::evaluate(&out.store);
    println!("\n=== Association ===");
    println!("  Tracks:          {}", metrics.n_tracks);
    println!("  Entities:        {}", metrics.n_labels);
    println!("  Purity:          {:.3}", metrics.purity);
    println!("  Fragmentation:   {:.2}", metrics.fragmentation);
    println!("  Label switches:  {}", metrics.label_switches);

    if let Some(prep_end) = scenario.prep_end {
        if let Some(cutoff) = log.sequence_at(prep_end) {
            println!("\n=== Sides (movement before seq {cutoff}) ===");
            for label in label_sides_by_early_movement(&out.store, cutoff, 5, 1) {
                println!(
                    "  {} {} early_movement={:.1}",
                    label.track_id, label.side, label.early_movement
                );
            }
        }
    }

    if let Some(path) = output_path {
        write_export(&out, &out.scores.iter().collect::<Vec<_>>(), path)?;
    }
    Ok(())
}

fn run_track(
    source: &mut dyn SampleSource,
    config: PipelineConfig,
    min_len: usize,
    top: usize,
    output_path: Option<&Path>,
) -> Result<()> {
    let (samples, report): (Vec<Sample>, _) = source.read_samples()?;
    info!(
        accepted = report.accepted,
        rejected = report.rejected(),
        "loaded samples"
    );

    let pipeline = Pipeline::new(config)?;
    let out = pipeline.run(samples);
    print_summary(&out);

    let reported: Vec<&TrackScore> = out
        .store
        .top(top, min_len)
        .into_iter()
        .filter_map(|t| out.scores.iter().find(|s| s.track_id == t.id()))
        .collect();

    println!("\n=== Top {} tracks (min length {}) ===", reported.len(), min_len);
    for s in &reported {
        println!(
            "  {} positions={} path={:.1} jumps={} last_move={} spread=({:.1}, {:.1})",
            s.track_id,
            s.position_count,
            s.path_length,
            s.jump_count,
            s.last_significant_move_time,
            s.position_spread.x,
            s.position_spread.y,
        );
    }

    if let Some(path) = output_path {
        write_export(&out, &reported, path)?;
    }
    Ok(())
}

fn print_summary(out: &PipelineOutput) {
    println!(
        "Done: {} samples -> {} tracks (track={}us, score={}us, total={}us)",
        out.store.sample_count(),
        out.store.len(),
        out.timing_track_us,
        out.timing_score_us,
        out.total_time_us,
    );
}

fn write_export(out: &PipelineOutput, scores: &[&TrackScore], path: &Path) -> Result<()> {
    let exported: Vec<_> = scores
        .iter()
        .filter_map(|s| out.store.get(s.track_id).map(|t| export_track(t, Some(*s))))
        .collect();
    std::fs::write(path, to_json(&exported)?)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Exported {} tracks to {}", exported.len(), path.display());
    Ok(())
}
