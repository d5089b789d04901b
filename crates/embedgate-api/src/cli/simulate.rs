//! `embedgate simulate` -- run the simulated remote inference service.

use std::time::Duration;

use clap::Args;
use secrecy::SecretString;
use tokio::net::TcpListener;

use embedgate_infra::simulator::{DEFAULT_API_KEY, SimulatorConfig, simulator_router};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Address to bind to.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, env = "TRITON_MOCK_PORT", default_value_t = 8001)]
    pub port: u16,

    /// API key required by `/v1/get_embedding`.
    #[arg(long, env = "MODEL_SERVER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Artificial latency per response, in milliseconds.
    #[arg(long, default_value_t = 30)]
    pub latency_ms: u64,

    /// Answer every protocol route with this HTTP status.
    #[arg(long)]
    pub fail_status: Option<u16>,
}

impl SimulateArgs {
    fn simulator_config(&self) -> SimulatorConfig {
        let api_key = self.api_key.clone().unwrap_or_else(|| DEFAULT_API_KEY.to_string());
        let mut config = SimulatorConfig::default()
            .with_api_key(SecretString::from(api_key))
            .with_latency(Duration::from_millis(self.latency_ms));
        if let Some(status) = self.fail_status {
            config = config.with_forced_status(status);
        }
        config
    }
}

/// Serve the simulator until Ctrl+C / SIGTERM.
pub async fn run_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&addr).await?;

    println!(
        "  {} Simulated inference service listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );

    let router = simulator_router(args.simulator_config());
    axum::serve(listener, router)
        .with_graceful_shutdown(crate::shutdown_signal())
        .await?;
    Ok(())
}
