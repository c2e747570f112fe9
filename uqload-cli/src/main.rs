mod cli;
mod config;
mod output;

use std::fmt::Write;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use colored::*;
use indicatif::{ProgressState, ProgressStyle};
use inquire::{Confirm, InquireError};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Level, error, info, info_span};
use tracing_indicatif::{IndicatifLayer, filter::IndicatifFilter, span_ext::IndicatifSpanExt};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};
use uqload_dl::{
    DownloadOutcome, ProgressCallback, Resolver,
    progress::{percent_complete, render_bar},
};

use crate::{cli::Args, config::AppConfig};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Application error: {e:#}");
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    init_logging(args.verbose, args.quiet);

    let config = AppConfig::load(args.config.as_deref())?;
    let output_dir = args.outdir.clone().or_else(|| config.output_dir.clone());

    let download_span = info_span!("download", indicatif.pb_show = true);
    download_span.pb_set_style(&download_style()?);
    let bar = download_span.clone();
    let progress: ProgressCallback = Arc::new(move |done, total| {
        bar.pb_set_length(total);
        bar.pb_set_position(done);
    });

    let resolver = Resolver::builder(args.url.as_str())
        .output_file_opt(args.name.clone())
        .output_dir_opt(output_dir)
        .on_progress(progress)
        .config(config.resolver_config())
        .build()
        .with_context(|| format!("Invalid input for `{}`", args.url))?;

    let metadata = resolver
        .metadata()
        .await
        .context("Failed to fetch video information")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(metadata)?);
    } else {
        print!("{}", output::format_video_info(metadata, true));
        println!();
    }

    if !args.yes && !confirm_download()? {
        println!("The download has been cancelled");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping the download");
            on_interrupt.cancel();
        }
    });

    let outcome = resolver
        .download(&cancel)
        .instrument(download_span)
        .await?;
    // The progress callback holds the last span handle; dropping it clears the bar.
    drop(resolver);

    match outcome {
        DownloadOutcome::Completed { path, .. } => {
            println!("{} {}", "Video saved as:".green(), path.display());
            println!("The video has been downloaded successfully");
        }
        DownloadOutcome::Cancelled { path, bytes } => {
            println!("{}", "Operation canceled".yellow());
            println!("Partial file kept at {} ({bytes} bytes)", path.display());
        }
        DownloadOutcome::Failed { reason } => {
            println!("{} {reason}", "An error occurred:".red());
        }
    }

    Ok(())
}

fn confirm_download() -> anyhow::Result<bool> {
    match Confirm::new("Do you want to download the video?")
        .with_default(false)
        .prompt()
    {
        Ok(answer) => Ok(answer),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
        Err(e) => Err(e).context("Failed to read the confirmation"),
    }
}

/// `Downloading... |{bar}| {percent}% completed`, drawn with the same
/// 40-column bar the library renders.
fn download_style() -> anyhow::Result<ProgressStyle> {
    Ok(
        ProgressStyle::with_template("Downloading... |{uqbar}| {uqpct} completed")?
            .with_key("uqbar", |state: &ProgressState, w: &mut dyn Write| {
                write!(w, "{}", render_bar(percent_of(state))).unwrap()
            })
            .with_key("uqpct", |state: &ProgressState, w: &mut dyn Write| {
                write!(w, "{:.2}%", percent_of(state)).unwrap()
            }),
    )
}

fn percent_of(state: &ProgressState) -> f64 {
    state
        .len()
        .and_then(|total| percent_complete(state.pos(), total).ok())
        .unwrap_or(0.0)
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    // Log lines go through the indicatif writer so they print above the bar.
    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_target(false)
                .with_level(verbose)
                .with_filter(filter),
        )
        .with(indicatif_layer.with_filter(IndicatifFilter::new(false)))
        .init();
}
