use super::ensemble::{self, EnsembleSummary};
use super::relaxation::{self, RelaxationAnalysis};
use crate::core::models::curve::Curve;
use crate::core::models::curve_set::CurveSet;
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// One residue of a run: a chain length `N` and the data file holding its time series.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueInput {
    pub label: String,
    pub chain_length: f64,
    pub data_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunInput {
    pub id: String,
    pub residues: Vec<ResidueInput>,
}

impl RunInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            residues: Vec::new(),
        }
    }
}

/// Receives pipeline results as they become available.
///
/// An error returned from a sink aborts the pipeline; analysis failures of a single residue
/// never reach the sink.
pub trait AnalysisSink {
    fn residue_analyzed(
        &mut self,
        run: &str,
        residue: &ResidueInput,
        analysis: &RelaxationAnalysis,
    ) -> Result<(), EngineError>;

    fn ensemble_summarized(&mut self, summary: &EnsembleSummary) -> Result<(), EngineError>;
}

/// A residue excluded from aggregation.
#[derive(Debug)]
pub struct ResidueFailure {
    pub run: String,
    pub residue: String,
    pub path: PathBuf,
    pub error: EngineError,
}

#[derive(Debug)]
pub struct PipelineOutcome {
    /// Per-run `(N, τ₀)` curves, keyed by run id.
    pub runs: CurveSet,
    /// `None` when no run produced a single relaxation time.
    pub summary: Option<EnsembleSummary>,
    pub failures: Vec<ResidueFailure>,
}

/// Analyzes every residue of every run, collects `(N, τ₀)` per run and summarizes the
/// ensemble.
///
/// Residues that fail to load, fail a phase, or yield no relaxation time are logged and
/// skipped. A run without any relaxation time is left out of the ensemble.
#[instrument(skip_all, name = "pipeline_workflow", fields(runs = inputs.len()))]
pub fn run(
    inputs: &[RunInput],
    config: &AnalysisConfig,
    sink: &mut dyn AnalysisSink,
    reporter: &ProgressReporter,
) -> Result<PipelineOutcome, EngineError> {
    let total: usize = inputs.iter().map(|r| r.residues.len()).sum();
    info!(residues = total, "Starting relaxation pipeline.");

    reporter.report(Progress::PhaseStart { name: "Residues" });
    reporter.report(Progress::TaskStart {
        total_steps: total as u64,
    });

    let silent = ProgressReporter::new();
    let mut runs = CurveSet::new();
    let mut failures = Vec::new();

    for input in inputs {
        reporter.message(format!("Run {}", input.id));
        let mut points = Vec::with_capacity(input.residues.len());

        for residue in &input.residues {
            let outcome = relaxation::run_file(&residue.data_path, config, &silent);
            reporter.report(Progress::TaskIncrement);

            let analysis = match outcome {
                Ok(analysis) => analysis,
                Err(error) => {
                    warn!(
                        run = %input.id,
                        residue = %residue.label,
                        path = %residue.data_path.display(),
                        error = %error,
                        "Residue analysis failed; excluded from aggregation."
                    );
                    failures.push(ResidueFailure {
                        run: input.id.clone(),
                        residue: residue.label.clone(),
                        path: residue.data_path.clone(),
                        error,
                    });
                    continue;
                }
            };

            sink.residue_analyzed(&input.id, residue, &analysis)?;

            match analysis.relaxation_time() {
                Some(tau) => points.push((residue.chain_length, tau)),
                None => warn!(
                    run = %input.id,
                    residue = %residue.label,
                    status = ?analysis.fit.status,
                    rate = analysis.fit.rate,
                    "No relaxation time for residue; excluded from aggregation."
                ),
            }
        }

        if points.is_empty() {
            warn!(run = %input.id, "Run produced no relaxation times; skipped.");
            continue;
        }
        debug!(run = %input.id, points = points.len(), "Collected run curve.");
        runs.insert(input.id.clone(), Curve::from_points(points));
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let summary = if runs.is_empty() {
        warn!("No run produced relaxation times; ensemble summary skipped.");
        None
    } else {
        let summary = ensemble::run(&runs, &config.reference, reporter)?;
        sink.ensemble_summarized(&summary)?;
        Some(summary)
    };

    info!(
        runs = runs.len(),
        failures = failures.len(),
        "Relaxation pipeline finished."
    );
    Ok(PipelineOutcome {
        runs,
        summary,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AnalysisError;
    use crate::core::io::ColumnFileError;
    use crate::core::models::kind::DataKind;
    use crate::engine::config::{AnalysisConfigBuilder, FitStrategy, NormalizationMode};
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingSink {
        residues: Vec<(String, String, Option<f64>)>,
        summaries: usize,
    }

    impl AnalysisSink for RecordingSink {
        fn residue_analyzed(
            &mut self,
            run: &str,
            residue: &ResidueInput,
            analysis: &RelaxationAnalysis,
        ) -> Result<(), EngineError> {
            self.residues.push((
                run.to_string(),
                residue.label.clone(),
                analysis.relaxation_time(),
            ));
            Ok(())
        }

        fn ensemble_summarized(&mut self, _summary: &EnsembleSummary) -> Result<(), EngineError> {
            self.summaries += 1;
            Ok(())
        }
    }

    fn config() -> AnalysisConfig {
        AnalysisConfigBuilder::new()
            .data_kind(DataKind::EndToEndVector)
            .max_lag(150)
            .min_threshold(1e-5)
            .max_threshold(1.0)
            .normalization(NormalizationMode::LagZero)
            .fit_strategy(FitStrategy::LevenbergMarquardt)
            .reference_slope(2.0)
            .build()
            .unwrap()
    }

    /// Writes an `r_end_vec.dat` whose x component decays with the given rate.
    fn write_vectors(path: &Path, samples: usize, rate: f64) {
        let mut text = String::from("# x y z\n");
        for i in 0..samples {
            let x = (-rate * i as f64).exp();
            text.push_str(&format!("{x} 1 0\n"));
        }
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn residue(dir: &Path, run: &str, n: u32, rate: Option<f64>) -> ResidueInput {
        let label = format!("run1_inner1_outer1_factor1_residue{n}");
        let data_path = dir.join(run).join(&label).join("r_end_vec.dat");
        if let Some(rate) = rate {
            write_vectors(&data_path, 400, rate);
        }
        ResidueInput {
            label,
            chain_length: f64::from(n),
            data_path,
        }
    }

    #[test]
    fn collects_relaxation_times_per_run_and_summarizes() {
        let dir = tempdir().unwrap();
        let mut first = RunInput::new("20240101_120000");
        first.residues.push(residue(dir.path(), &first.id, 10, Some(0.05)));
        first.residues.push(residue(dir.path(), &first.id, 20, Some(0.02)));
        let mut second = RunInput::new("20240102_120000");
        second.residues.push(residue(dir.path(), &second.id, 10, Some(0.04)));

        let mut sink = RecordingSink::default();
        let outcome = run(
            &[first, second],
            &config(),
            &mut sink,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.runs.len(), 2);
        assert_eq!(
            outcome.runs.get("20240101_120000").unwrap().x(),
            &[10.0, 20.0]
        );
        assert_eq!(sink.residues.len(), 3);
        assert!(sink.residues.iter().all(|(_, _, tau)| tau.is_some()));
        assert_eq!(sink.summaries, 1);

        let summary = outcome.summary.unwrap();
        assert_eq!(summary.aggregated.grid, vec![10.0, 20.0]);
        assert_eq!(summary.aggregated.runs, 2);
    }

    #[test]
    fn failing_residue_is_recorded_and_skipped() {
        let dir = tempdir().unwrap();
        let mut input = RunInput::new("20240101_120000");
        input.residues.push(residue(dir.path(), &input.id, 10, Some(0.05)));
        input.residues.push(residue(dir.path(), &input.id, 20, None));

        let mut sink = RecordingSink::default();
        let outcome = run(&[input], &config(), &mut sink, &ProgressReporter::new()).unwrap();

        assert_eq!(outcome.failures.len(), 1);
        let failure = &outcome.failures[0];
        assert!(failure.residue.ends_with("residue20"));
        assert!(matches!(
            failure.error,
            EngineError::DataFile {
                source: ColumnFileError::Io { .. }
            }
        ));
        assert_eq!(outcome.runs.get("20240101_120000").unwrap().len(), 1);
        assert_eq!(sink.residues.len(), 1);
    }

    #[test]
    fn run_without_results_is_left_out() {
        let dir = tempdir().unwrap();
        let short = dir.path().join("short").join("r_end_vec.dat");
        fs::create_dir_all(short.parent().unwrap()).unwrap();
        fs::write(&short, "1 0 0\n").unwrap();

        let mut input = RunInput::new("20240101_120000");
        input.residues.push(ResidueInput {
            label: "residue5".to_string(),
            chain_length: 5.0,
            data_path: short,
        });

        let mut sink = RecordingSink::default();
        let outcome = run(&[input], &config(), &mut sink, &ProgressReporter::new()).unwrap();

        assert!(outcome.runs.is_empty());
        assert!(outcome.summary.is_none());
        assert_eq!(sink.summaries, 0);
        assert!(matches!(
            outcome.failures[0].error,
            EngineError::Analysis {
                source: AnalysisError::InvalidInput(_)
            }
        ));
    }

    #[test]
    fn reports_one_increment_per_residue() {
        let dir = tempdir().unwrap();
        let mut input = RunInput::new("20240101_120000");
        input.residues.push(residue(dir.path(), &input.id, 10, Some(0.05)));
        input.residues.push(residue(dir.path(), &input.id, 20, None));

        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let mut sink = RecordingSink::default();
        run(&[input], &config(), &mut sink, &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert_eq!(events[1], Progress::TaskStart { total_steps: 2 });
        let increments = events
            .iter()
            .filter(|e| **e == Progress::TaskIncrement)
            .count();
        assert_eq!(increments, 2);
    }

    #[test]
    fn announces_each_run_before_its_residues() {
        let dir = tempdir().unwrap();
        let mut first = RunInput::new("20240101_120000");
        first.residues.push(residue(dir.path(), &first.id, 10, Some(0.05)));
        let mut second = RunInput::new("20240102_120000");
        second.residues.push(residue(dir.path(), &second.id, 10, Some(0.04)));

        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let mut sink = RecordingSink::default();
        run(&[first, second], &config(), &mut sink, &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        let messages: Vec<&Progress> = events
            .iter()
            .filter(|e| matches!(e, Progress::Message(_)))
            .collect();
        assert_eq!(
            messages,
            vec![
                &Progress::Message("Run 20240101_120000".to_string()),
                &Progress::Message("Run 20240102_120000".to_string()),
            ]
        );

        let first_message = events
            .iter()
            .position(|e| matches!(e, Progress::Message(_)))
            .unwrap();
        let first_increment = events
            .iter()
            .position(|e| *e == Progress::TaskIncrement)
            .unwrap();
        assert!(first_message < first_increment);
    }
}
