use lmguide_relay::{config::Config, pipeline};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries only the payload
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lmguide_relay=info")),
        )
        .init();

    info!("Starting lmguide-relay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;

    let report = pipeline::run(&config)
        .await
        .inspect_err(|e| error!(error = %e, "Run aborted"))?;
    println!("{}", report.payload.to_json()?);

    info!(
        status = report.result.status.as_str(),
        delivery = ?report.delivery,
        "Run complete"
    );

    Ok(())
}
