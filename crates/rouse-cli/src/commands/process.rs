use crate::cli::ProcessArgs;
use crate::config::builder::build_config;
use crate::discovery::discover_runs;
use crate::error::{CliError, Result};
use crate::utils::progress::ProgressDisplay;
use chrono::{DateTime, Local};
use rouse::core::io::writer;
use rouse::core::models::kind::DataKind;
use rouse::engine::error::EngineError;
use rouse::engine::progress::ProgressReporter;
use rouse::workflows::ensemble::EnsembleSummary;
use rouse::workflows::pipeline::{self, AnalysisSink, ResidueInput};
use rouse::workflows::relaxation::RelaxationAnalysis;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const FIT_SUMMARY_FILE: &str = "A0_vs_tau0.txt";
pub const POINTS_FILE: &str = "relaxation_points.txt";
pub const STDDEV_FILE: &str = "relaxation_stddev.txt";
pub const SLOPE_LINE_FILE: &str = "slope_line.txt";
pub const REGRESSION_LINE_FILE: &str = "regression_line.txt";

/// `<output>/<data file>/rouse_<YYYYmmdd_HH_MM_SS>`
pub fn output_directory(root: &Path, kind: DataKind, now: DateTime<Local>) -> PathBuf {
    root.join(kind.file_name())
        .join(format!("rouse_{}", now.format("%Y%m%d_%H_%M_%S")))
}

/// Writes every pipeline result as column text below one output directory.
pub struct FileSink {
    dir: PathBuf,
    residues_written: usize,
}

impl FileSink {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            residues_written: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl AnalysisSink for FileSink {
    fn residue_analyzed(
        &mut self,
        run: &str,
        residue: &ResidueInput,
        analysis: &RelaxationAnalysis,
    ) -> std::result::Result<(), EngineError> {
        let id = format!("{}_{}", run, residue.label);
        writer::write_curve(
            &self.dir.join(format!("autocorr_{}.txt", id)),
            &analysis.lag_curve.to_curve(),
        )?;
        writer::write_curve(
            &self.dir.join(format!("exp_decay_{}.txt", id)),
            &analysis.decay_curve,
        )?;
        if let Some(tau) = analysis.relaxation_time() {
            writer::append_pair(
                &self.dir.join(FIT_SUMMARY_FILE),
                analysis.fit.amplitude,
                tau,
            )?;
        }
        self.residues_written += 1;
        Ok(())
    }

    fn ensemble_summarized(
        &mut self,
        summary: &EnsembleSummary,
    ) -> std::result::Result<(), EngineError> {
        writer::write_curve(
            &self.dir.join(POINTS_FILE),
            &summary.aggregated.mean_curve(),
        )?;
        writer::write_curve(
            &self.dir.join(STDDEV_FILE),
            &summary.aggregated.std_dev_curve(),
        )?;
        if let Some(line) = &summary.reference_line {
            writer::write_curve(&self.dir.join(SLOPE_LINE_FILE), line)?;
        }
        if let Some(line) = &summary.regression_line {
            writer::write_curve(&self.dir.join(REGRESSION_LINE_FILE), line)?;
        }
        Ok(())
    }
}

pub fn run(args: ProcessArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app = build_config(&args.analysis, args.input.as_deref(), args.output.as_deref())?;
    let input = app.input_dir.ok_or_else(|| {
        CliError::Argument("no input directory given (--input or [input] directory)".to_string())
    })?;
    let output_root = app.output_dir.ok_or_else(|| {
        CliError::Argument(
            "no output directory given (--output or [output] directory)".to_string(),
        )
    })?;

    let kind = app.analysis.data_kind;
    let runs = discover_runs(&input, &app.discovery, kind)?;
    if runs.is_empty() {
        warn!(input = %input.display(), "No run directories matched.");
        println!("Warning: no run directories matched in {}", input.display());
        return Ok(());
    }

    let out_dir = output_directory(&output_root, kind, Local::now());
    std::fs::create_dir_all(&out_dir)?;
    info!(output = %out_dir.display(), "Writing results.");

    let progress = ProgressDisplay::new();
    let reporter = ProgressReporter::with_callback(progress.callback());
    let mut sink = FileSink::new(out_dir);

    println!(
        "Analyzing {} run(s) of {} data...",
        runs.len(),
        kind.description()
    );
    let outcome = pipeline::run(&runs, &app.analysis, &mut sink, &reporter)?;

    for failure in &outcome.failures {
        println!("  ✗ {} / {}: {}", failure.run, failure.residue, failure.error);
    }
    match &outcome.summary {
        Some(summary) => println!(
            "✓ {} residue(s) analyzed, {} run(s) aggregated onto {} chain length(s). Results in {}",
            sink.residues_written,
            summary.aggregated.runs,
            summary.aggregated.len(),
            sink.dir().display()
        ),
        None => println!(
            "Warning: no relaxation times were obtained. Per-residue output in {}",
            sink.dir().display()
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::AnalysisArgs;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::tempdir;

    fn write_residue(root: &Path, run: &str, n: u32, rate: f64) {
        let dir = root
            .join(run)
            .join(format!("run1_inner1_outer1_factor1_residue{n}"));
        fs::create_dir_all(&dir).unwrap();
        let mut text = String::new();
        for i in 0..400 {
            let x = (-rate * i as f64).exp();
            text.push_str(&format!("{x} 1 0\n"));
        }
        fs::write(dir.join("r_end_vec.dat"), text).unwrap();
    }

    #[test]
    fn output_directory_is_timestamped_per_data_file() {
        let now = Local.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let dir = output_directory(Path::new("out"), DataKind::R2, now);
        assert_eq!(dir, Path::new("out/r2.dat/rouse_20240305_07_08_09"));
    }

    #[test]
    fn process_writes_per_residue_and_batch_files() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_residue(input.path(), "20240101_120000", 10, 0.05);
        write_residue(input.path(), "20240101_120000", 20, 0.02);
        write_residue(input.path(), "20240102_120000", 10, 0.04);

        let args = ProcessArgs {
            input: Some(input.path().to_path_buf()),
            output: Some(output.path().to_path_buf()),
            analysis: AnalysisArgs {
                max_lag: Some(150),
                max_threshold: Some(1.0),
                serial: true,
                ..AnalysisArgs::default()
            },
        };
        run(args).unwrap();

        let data_dir = output.path().join("r_end_vec.dat");
        let batches: Vec<_> = fs::read_dir(&data_dir).unwrap().collect();
        assert_eq!(batches.len(), 1);
        let batch = batches.into_iter().next().unwrap().unwrap().path();

        for name in [
            "autocorr_20240101_120000_run1_inner1_outer1_factor1_residue10.txt",
            "exp_decay_20240102_120000_run1_inner1_outer1_factor1_residue10.txt",
            FIT_SUMMARY_FILE,
            POINTS_FILE,
            STDDEV_FILE,
            SLOPE_LINE_FILE,
        ] {
            assert!(batch.join(name).is_file(), "missing {name}");
        }
        let summary = fs::read_to_string(batch.join(FIT_SUMMARY_FILE)).unwrap();
        assert_eq!(summary.lines().count(), 3);
        assert!(summary.lines().all(|line| line.contains('\t')));
        let points = fs::read_to_string(batch.join(POINTS_FILE)).unwrap();
        assert_eq!(points.lines().count(), 2);
    }

    #[test]
    fn missing_output_directory_is_an_argument_error() {
        let input = tempdir().unwrap();
        let args = ProcessArgs {
            input: Some(input.path().to_path_buf()),
            output: None,
            analysis: AnalysisArgs::default(),
        };
        assert!(matches!(run(args), Err(CliError::Argument(_))));
    }
}
