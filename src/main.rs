use std::sync::Arc;

use clap::Parser;
use log::{error, info};

use flowtap::configuration::{Args, Config};
use flowtap::data_capture::{CaptureSession, ConsoleReporter};
use flowtap::error_handling::types::HostError;
use flowtap::host::{pump_events, StreamSummary};
use flowtap::network::FlowFilter;
use flowtap::storage::FileStorage;

#[tokio::main]
async fn main() {
    // RUST_LOG overrides the default level
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .init();

    let args = Args::parse();

    let config = Config::load(&args).unwrap_or_else(|e| {
        error!("Unable to load configuration: {}", e);
        std::process::exit(1);
    });

    // The output directory is created once, before any flow is seen.
    let storage = FileStorage::new(&config.output_dir).unwrap_or_else(|e| {
        error!("Unable to prepare output directory: {}", e);
        std::process::exit(1);
    });

    let console = if config.console {
        ConsoleReporter::stdout()
    } else {
        ConsoleReporter::disabled()
    };
    let session = CaptureSession::new(
        FlowFilter::new(config.host_pattern.clone(), config.path_pattern.clone()),
        Arc::new(storage),
    )
    .with_console(console)
    .with_response_preview(config.response_preview_bytes);

    if let Err(e) = session
        .console()
        .banner(&config.output_dir.display().to_string(), &config.host_pattern)
    {
        error!("Unable to write to console: {}", e);
        std::process::exit(1);
    }

    info!("[{}] Capture session started", session.session_id());

    let result = match config.input {
        Some(ref path) => match tokio::fs::File::open(path).await {
            Ok(file) => pump_events(file, &session).await,
            Err(e) => {
                error!("Unable to open event input {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => pump_events(tokio::io::stdin(), &session).await,
    };

    match result {
        Ok(StreamSummary { events, skipped }) => {
            info!(
                "[{}] Capture finished: {} event(s), {} skipped, {} request(s) captured",
                session.session_id(),
                events,
                skipped,
                session.counter()
            );
        }
        Err(e @ HostError::HookFailed { .. }) => {
            error!("Capture aborted: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Event input failed: {}", e);
            std::process::exit(1);
        }
    }
}
