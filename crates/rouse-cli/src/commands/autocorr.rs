use crate::cli::AutocorrArgs;
use crate::config::builder::build_config;
use crate::error::Result;
use crate::utils::progress::ProgressDisplay;
use rouse::core::io::writer;
use rouse::core::models::kind::DataKind;
use rouse::engine::progress::ProgressReporter;
use rouse::workflows::relaxation;
use tracing::info;

pub fn run(args: AutocorrArgs) -> Result<()> {
    let mut analysis_args = args.analysis;
    if analysis_args.data_kind.is_none() {
        analysis_args.data_kind = args
            .file
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(DataKind::from_file_name);
    }
    let app = build_config(&analysis_args, None, None)?;

    let progress = ProgressDisplay::new();
    let reporter = ProgressReporter::with_callback(progress.callback());

    info!(
        file = %args.file.display(),
        kind = %app.analysis.data_kind,
        "Analyzing single file."
    );
    let analysis = relaxation::run_file(&args.file, &app.analysis, &reporter)?;

    if let Some(dir) = &args.output {
        writer::write_curve(&dir.join("autocorr.txt"), &analysis.lag_curve.to_curve())?;
        writer::write_curve(&dir.join("exp_decay.txt"), &analysis.decay_curve)?;
        info!(output = %dir.display(), "Curves written.");
    }

    let fit = &analysis.fit;
    println!("lags in band:  {}", analysis.lag_curve.len());
    println!("strategy:      {}", fit.strategy);
    println!("A0:            {}", fit.amplitude);
    match fit.relaxation_time {
        Some(tau) => println!("tau0:          {}", tau),
        None => println!("tau0:          n/a (rate {}, {:?})", fit.rate, fit.status),
    }
    if let Some(report) = &analysis.equilibration {
        println!(
            "equilibrated:  {}",
            if report.equilibrated { "yes" } else { "no" }
        );
    }
    Ok(())
}
