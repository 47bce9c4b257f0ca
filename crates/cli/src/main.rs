mod args;
mod prompt;
mod render;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use videology_core::{
    load_config_or_default, validate_config, ConversionOrchestrator, ConversionSession, Engine,
    FfmpegEngine, FsStager, LoggingConfig, PathPicker, Stager,
};

use args::Args;
use prompt::PromptPicker;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    let args = Args::parse();

    // Determine config path
    let config_path = args.config_path();

    let config = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    init_logging(&config.logging);
    info!("Configuration loaded from {:?}", config_path);

    validate_config(&config).context("Configuration validation failed")?;

    let engine = Arc::new(FfmpegEngine::new(config.engine.clone()));

    if args.check {
        engine.validate().await.context("FFmpeg check failed")?;
        println!(
            "ffmpeg ({}) and ffprobe ({}) are available",
            config.engine.ffmpeg_path.display(),
            config.engine.ffprobe_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let stager = Arc::new(FsStager::new(config.staging.clone()));
    let orchestrator = ConversionOrchestrator::new(config.orchestrator.clone(), engine, stager);
    info!(
        "Writing converted files to {:?}",
        orchestrator.config().output_dir
    );

    let prompt = PromptPicker::stdin();

    let picked = match &args.input {
        Some(path) => orchestrator.pick_input(&PathPicker::new(path)).await,
        None => orchestrator.pick_input(&prompt).await,
    };
    if let Err(e) = picked {
        debug!("Input rejected: {}", e);
        return Ok(finish(&orchestrator.snapshot(), args.json));
    }

    let format = match args.format {
        Some(format) => Some(format),
        None => prompt
            .choose_format()
            .await
            .context("Failed to read the output type")?,
    };
    if let Some(format) = format {
        orchestrator
            .set_target_format(format)
            .context("Failed to set the output type")?;
    }

    if let Err(e) = orchestrator.convert().await {
        debug!("Conversion did not start: {}", e);
        return Ok(finish(&orchestrator.snapshot(), args.json));
    }

    let session = watch_conversion(&orchestrator).await;
    Ok(finish(&session, args.json))
}

fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    // stdout is reserved for results
    let (plain, json) = if config.json {
        (
            None,
            Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
    } else {
        (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .init();
}

/// Renders progress until the conversion settles. A shutdown signal stops
/// the conversion instead of killing the process.
async fn watch_conversion<E, S>(orchestrator: &ConversionOrchestrator<E, S>) -> ConversionSession
where
    E: Engine + 'static,
    S: Stager + 'static,
{
    let mut rx = orchestrator.subscribe();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut stopping = false;
    let mut last_percent = None;

    loop {
        {
            let session = rx.borrow_and_update();
            if session.is_idle() {
                return session.clone();
            }
            let percent = render::percent(session.progress);
            if last_percent != Some(percent) {
                eprintln!("{}", render::progress_line(session.progress));
                last_percent = Some(percent);
            }
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    return orchestrator.snapshot();
                }
            }
            _ = &mut shutdown, if !stopping => {
                info!("Shutdown requested, stopping conversion");
                stopping = true;
                orchestrator.cancel().await;
            }
        }
    }
}

/// Prints the outcome and picks the exit code.
fn finish(session: &ConversionSession, json: bool) -> ExitCode {
    if let Some(message) = &session.message {
        if json {
            eprintln!("{}", message.text());
        } else {
            println!("{}", message.text());
        }
    }

    if json {
        match serde_json::to_string_pretty(session) {
            Ok(out) => println!("{}", out),
            Err(e) => warn!("Failed to serialize session: {}", e),
        }
    }

    if render::is_success(session) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
