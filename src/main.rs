use inbox_triage::api;
use inbox_triage::config::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  Check the INBOX_TRIAGE_*, HF_* and TRIAGE_* environment variables");
        std::process::exit(1);
    });

    eprintln!("📧 Inbox Triage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Health:   GET  http://{}:{}/health", config.host, config.port);
    eprintln!("   Classify: POST http://{}:{}/classify", config.host, config.port);
    eprintln!("   Classifier: {}", config.inference.classify_url);
    eprintln!("   Generator:  {}", config.inference.generate_url);
    eprintln!(
        "   Auth: {}",
        if config.inference.api_key.is_some() {
            "bearer token"
        } else {
            "none (HF_API_KEY not set)"
        }
    );
    eprintln!("   Keywords: {:?}\n", config.keywords);

    api::serve(config).await?;

    Ok(())
}
