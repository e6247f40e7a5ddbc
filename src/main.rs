//! tapline - serial, receive-only TCP listener
//!
//! This is the entry point. It parses flags, sets up logging, binds the
//! listener and runs the accept loop until Ctrl+C.

use anyhow::Context;
use tapline::config::HELP;
use tapline::{Config, Invocation, Listener, StdoutSink};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = match Config::from_args() {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help) => {
            println!("{}", HELP);
            return Ok(());
        }
        Ok(Invocation::Version) => {
            println!("tapline version {}", tapline::VERSION);
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", HELP);
            std::process::exit(2);
        }
    };

    // Set up logging. Stdout carries the received data, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();

    info!(version = tapline::VERSION, "Starting tapline");

    // Bind the TCP listener; failure here is fatal
    let listener = Listener::bind(&config.bind_address())
        .await
        .context("could not start listener")?
        .with_capacity(config.buffer_capacity)
        .with_backoff(config.backoff.clone());
    info!(
        buffer_capacity = listener.capacity(),
        "Ready to accept connections, Ctrl+C to stop"
    );

    // Set up graceful shutdown
    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received, stopping listener..."),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    listener.run_until(StdoutSink::stdout(), shutdown).await;

    info!("Shutdown complete");
    Ok(())
}
