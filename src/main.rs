use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets may live in a local .env file; a missing file is fine.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    mygo_bot::cli::run().await
}
