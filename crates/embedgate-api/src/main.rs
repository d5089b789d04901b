//! embedgate CLI and HTTP service entry point.
//!
//! Binary name: `embedgate`
//!
//! Parses CLI arguments, resolves the gateway configuration, then either
//! serves the inference API, runs a one-shot inference, or runs the
//! simulated remote inference service.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,embedgate=debug",
        _ => "trace",
    };
    embedgate_observe::tracing_setup::init_tracing(filter, cli.otel)?;

    let result = run(cli).await;
    embedgate_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve(gateway) => {
            let config = gateway.resolve().await?;
            let addr = config.bind_addr();
            let state = AppState::new(config);

            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!();
                println!(
                    "  {} embedgate listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!(
                    "  {} backend: {}",
                    console::style("→").dim(),
                    console::style(state.provider_name()).bold()
                );
                println!();
            }
            tracing::info!(%addr, backend = %state.provider_name(), "serving inference API");

            let router = http::router::build_router(state);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Infer {
            gateway,
            modality,
            input,
            json,
        } => {
            let config = gateway.resolve().await?;
            let state = AppState::new(config);
            cli::infer::run_infer(&state, modality, input, json).await?;
        }

        Commands::Simulate(args) => {
            cli::simulate::run_simulate(args).await?;
        }

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "embedgate", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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

    tracing::info!("shutdown signal received");
}
