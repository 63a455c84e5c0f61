use clap::{Args, Parser, Subcommand};
use rouse::core::models::kind::DataKind;
use rouse::engine::config::{FitStrategy, NormalizationMode};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Rouse relaxation analysis - autocorrelation, exponential-decay fitting and multi-run aggregation of polymer simulation output.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel autocorrelation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze every run directory under an input folder and aggregate relaxation times.
    Process(ProcessArgs),
    /// Compute the autocorrelation and decay fit of a single data file.
    Autocorr(AutocorrArgs),
    /// Find the intersection of two two-column curves.
    Intersect(IntersectArgs),
}

/// Analysis parameters shared by `process` and `autocorr`.
#[derive(Args, Debug, Clone, Default)]
pub struct AnalysisArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Observable to analyze (r2 or end-to-end-vector).
    #[arg(short = 'k', long, value_name = "KIND")]
    pub data_kind: Option<DataKind>,

    // --- Autocorrelation Overrides ---
    /// Largest lag (exclusive) of the autocorrelation.
    #[arg(short = 'm', long, value_name = "INT")]
    pub max_lag: Option<usize>,

    /// Smallest autocorrelation value kept for fitting.
    #[arg(long, value_name = "FLOAT")]
    pub min_threshold: Option<f64>,

    /// Largest autocorrelation value kept for fitting.
    #[arg(long, value_name = "FLOAT")]
    pub max_threshold: Option<f64>,

    /// Normalization of vector autocorrelation (raw, variance or lag-zero).
    #[arg(short, long, value_name = "MODE")]
    pub normalization: Option<NormalizationMode>,

    /// Compute the autocorrelation on a single thread.
    #[arg(long)]
    pub serial: bool,

    // --- Fit Overrides ---
    /// Fit the natural log of the autocorrelation.
    #[arg(long)]
    pub log_y: bool,

    /// Fit strategy (levenberg-marquardt or log-linear).
    #[arg(short, long, value_name = "STRATEGY")]
    pub strategy: Option<FitStrategy>,

    /// Slope of the reference line drawn through the aggregated relaxation times.
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub slope: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S autocorrelation.max-lag=500
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `process` subcommand.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Folder holding the timestamped run directories.
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Folder receiving the analysis output.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

/// Arguments for the `autocorr` subcommand.
#[derive(Args, Debug)]
pub struct AutocorrArgs {
    /// Data file holding the time series.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub file: PathBuf,

    /// Write the autocorrelation and fitted decay curves into this folder.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

/// Arguments for the `intersect` subcommand.
#[derive(Args, Debug)]
pub struct IntersectArgs {
    /// First two-column curve file.
    #[arg(long, required = true, value_name = "PATH")]
    pub first: PathBuf,

    /// Second two-column curve file.
    #[arg(long, required = true, value_name = "PATH")]
    pub second: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_arguments_are_parsed() {
        let cli = Cli::parse_from([
            "rouse",
            "-vv",
            "process",
            "--input",
            "runs",
            "--output",
            "out",
            "--data-kind",
            "r2",
            "--normalization",
            "variance",
            "--strategy",
            "log-linear",
            "--serial",
            "-S",
            "fit.log-y=true",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Process(args) = cli.command else {
            panic!("expected process command");
        };
        assert_eq!(args.input, Some(PathBuf::from("runs")));
        assert_eq!(args.analysis.data_kind, Some(DataKind::R2));
        assert_eq!(
            args.analysis.normalization,
            Some(NormalizationMode::Variance)
        );
        assert_eq!(args.analysis.strategy, Some(FitStrategy::LogLinear));
        assert!(args.analysis.serial);
        assert_eq!(args.analysis.set_values, vec!["fit.log-y=true"]);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from([
            "rouse",
            "-q",
            "-v",
            "intersect",
            "--first",
            "a",
            "--second",
            "b",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_data_kind_is_rejected() {
        let result = Cli::try_parse_from([
            "rouse",
            "autocorr",
            "--file",
            "r2.dat",
            "--data-kind",
            "pressure",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from([
            "rouse", "autocorr", "--file", "r2.dat", "-j", "4", "--slope", "-0.5",
        ]);
        assert_eq!(cli.threads, Some(4));
        let Commands::Autocorr(args) = cli.command else {
            panic!("expected autocorr command");
        };
        assert_eq!(args.analysis.slope, Some(-0.5));
    }
}
