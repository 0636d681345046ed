use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scriptdeck_client::ExecutionApi;
use scriptdeck_console::commands::{Reply, Session};
use scriptdeck_console::config::ConsoleConfig;
use scriptdeck_console::{background, state::Console};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scriptdeck_console=info,scriptdeck_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let config = ConsoleConfig::from_env()?;
    tracing::info!(api_url = %config.api_url, "Loaded console configuration");

    // --- Execution service client ---
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;
    let api = ExecutionApi::with_client(http, config.api_url.clone());

    // --- App state ---
    let console = Console::new(Arc::new(api), config);

    if let Err(e) = console.catalog.refresh().await {
        tracing::warn!(error = %e, "Starting without a script catalog");
    }

    // --- Pollers ---
    let pollers = background::spawn(&console);

    // Print notifications as they are raised.
    let mut notifications = console.notifications.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(n) => println!("{n}"),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Notification printer lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    println!("scriptdeck console, type 'help' for commands");
    tokio::select! {
        _ = command_loop(console.clone()) => {}
        _ = shutdown_signal() => {}
    }

    // --- Shutdown ---
    tracing::info!("Shutting down");
    pollers.shutdown().await;
    let _ = tokio::time::timeout(Duration::from_secs(5), console.shutdown()).await;
    printer.abort();
    tracing::info!("Graceful shutdown complete");

    Ok(())
}

/// Read commands from stdin until `quit` or end of input.
///
/// Detail output is tailed after each command.
async fn command_loop(console: Console) {
    let mut session = Session::new(console);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stdin");
                break;
            }
        };

        match session.handle_line(&line).await {
            Reply::Print(out) => {
                for l in out {
                    println!("{l}");
                }
            }
            Reply::Quit => break,
        }

        for chunk in session.tail_detail().await {
            print!("{chunk}");
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
