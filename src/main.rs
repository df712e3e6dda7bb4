//! parkstat - Earnings, traffic and occupancy analytics for parking stores

use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use parkstat::{
    cli::{Cli, Source, exit_code, parse_reference_time, resolve_source_report},
    report::{ReportOptions, generate_report},
};
use parkstat_core::error::Result;
use parkstat_core::provider::SnapshotSource;
use parkstat_core::report_types::ReportSection;
use parkstat_core::timezone::TimezoneConfig;
use parkstat_provider_file::FileSource;
use parkstat_provider_rtdb::RtdbSource;
use parkstat_terminal::get_formatter;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the snapshot source selected on the command line
fn create_source(cli: &Cli, source: Source) -> Result<Box<dyn SnapshotSource>> {
    Ok(match source {
        Source::Rtdb => Box::new(RtdbSource::new(
            cli.db_url.as_deref().unwrap_or_default(),
            cli.db_auth.clone(),
        )?),
        Source::File => Box::new(match &cli.snapshot {
            Some(path) => FileSource::new(path),
            None => FileSource::from_env()?,
        }),
    })
}

fn fetch_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Fetching snapshots");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

async fn run(cli: &Cli) -> Result<String> {
    let (source, report) = resolve_source_report(cli.command.as_ref());
    let section = ReportSection::from(report);
    info!("Running {} report from {}", section, source);

    let timezone = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.utc)?;
    info!("Using business timezone: {}", timezone.display_name());

    let now = match &cli.now {
        Some(input) => parse_reference_time(input)?,
        None => Utc::now(),
    };

    let options = ReportOptions {
        timezone,
        histogram_frame: cli.histogram_frame,
        parallel: cli.parallel,
    };

    let source = create_source(cli, source)?;

    let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());
    let progress = show_progress.then(fetch_spinner);
    let result = generate_report(source.as_ref(), now, &options).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let analytics = result?;
    let formatter = get_formatter(cli.json);
    Ok(formatter.format_section(&analytics, section))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging. --verbose overrides RUST_LOG.
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("parkstat=info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("parkstat=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Report failed: {}", e);
            let formatter = get_formatter(cli.json);
            if cli.json {
                println!("{}", formatter.format_error(&e.to_string()));
            } else {
                eprintln!("{}", formatter.format_error(&e.to_string()));
            }
            ExitCode::from(exit_code(&e))
        }
    }
}
