//! Command-line entry point for the section loader
//!
//! Loads a sections config, shows the initial section, then visits each
//! section named on the command line and prints the final navigation state
//! as JSON on stdout. Logs go to stderr.

mod controller;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use controller::LoggingController;
use section_loader_app::adapters::HttpContentSource;
use section_loader_app::{LoaderAppBuilder, NoopStartupHooks, SectionsConfig};
use section_loader_core::types::LoadOutcome;
use section_loader_core::LoaderResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "section-loader", version, about = "Drive section navigation from a config file")]
struct Args {
    /// Path to the sections config (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Override the config's base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Issue all visits at once instead of one after another
    #[arg(long)]
    concurrent: bool,

    /// Skip the initial section
    #[arg(long)]
    no_startup: bool,

    /// Sections to visit, in order
    sections: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();
    match run(&args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every visit succeeded
async fn run(args: &Args) -> anyhow::Result<bool> {
    let config = SectionsConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let base_url = args.base_url.clone().or_else(|| config.base_url.clone());
    let timeout = config.loader.fetch_timeout_ms.map(Duration::from_millis);

    let source = HttpContentSource::new(base_url.as_deref(), timeout)?;
    let mut builder = LoaderAppBuilder::new().content_source(Arc::new(source));
    for descriptor in &config.sections {
        builder = builder.controller(descriptor.id.clone(), Arc::new(LoggingController::factory));
    }
    let app = builder.sections_config(config).build()?;

    let mut ok = true;
    if !args.no_startup {
        if let Some(Err(_)) = app.run_startup(&NoopStartupHooks).await {
            ok = false;
        }
    }

    if args.concurrent {
        let handles: Vec<_> = args
            .sections
            .iter()
            .cloned()
            .map(|id| {
                let coordinator = Arc::clone(&app.coordinator);
                tokio::spawn(async move {
                    let result = coordinator.request_section(&id).await;
                    (id, result)
                })
            })
            .collect();
        for handle in handles {
            let (id, result) = handle.await.context("visit task panicked")?;
            ok &= report(&id, &result);
        }
    } else {
        for id in &args.sections {
            let result = app.navigate(id).await;
            ok &= report(id, &result);
        }
    }

    let snapshot = serde_json::to_string_pretty(&app.snapshot())?;
    println!("{snapshot}");
    Ok(ok)
}

fn report(id: &str, result: &LoaderResult<LoadOutcome>) -> bool {
    match result {
        Ok(outcome) => {
            tracing::info!(section = id, ?outcome, "visited");
            true
        }
        Err(e) if e.is_expected() => {
            tracing::warn!(section = id, code = e.code(), "{e}");
            false
        }
        Err(e) => {
            tracing::error!(section = id, code = e.code(), "{e}");
            false
        }
    }
}
