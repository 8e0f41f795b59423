use anyhow::Context;
use escm::http::HttpServer;
use escm::{AppConfig, Dashboard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load .env before reading keys
    dotenvy::dotenv().ok();

    println!("ESC-M: Ethical Supply Chain Mapper v{}", escm::version());
    println!("==========================================");

    let config = AppConfig::from_env();
    for (key, missing) in [
        ("NEWSDATA_API_KEY", config.news.api_key.is_none()),
        ("OPENSANCTIONS_API_KEY", config.sanctions.api_key.is_none()),
        ("SONAR_API_KEY", config.narrative.api_key.is_none()),
        ("SONAR_API_URL", config.narrative.api_url.is_none()),
    ] {
        if missing {
            tracing::warn!("{} is not set; the dependent checks will report errors", key);
        }
    }

    let dashboard = Dashboard::from_config(&config).context("failed to configure dashboard clients")?;
    let server = HttpServer::new(dashboard, config.http.clone());

    server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("server error: {}", e))?;

    Ok(())
}
