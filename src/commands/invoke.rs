use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::info;

use crate::config::Settings;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::fixture;
use crate::invoker::{self, Invocation};
use crate::output;

pub fn run(settings: &Settings) -> Result<()> {
    let log = invoker::prepare_log_file(&settings.log_file)?;
    let merged = fixture::load_merged(&settings.base, &settings.overlay)?;
    info!(keys = merged.len(), "merged request");
    let input = fixture::encode_line(&merged)?;

    let invocation = Invocation::new(
        settings.program.clone(),
        settings.program_args(),
        settings.log_file.clone(),
    );

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} Invoking {msg}...") {
        spinner.set_style(style);
    }
    spinner.set_message(settings.function.clone());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let stdout = invocation.run(log, &input);
    spinner.finish_and_clear();

    let report = Envelope::parse(&stdout?)?.into_report()?;
    info!(status = report.status_code(), "invocation finished");
    print!("{}", output::format_report(&report, &settings.output)?);
    Ok(())
}
