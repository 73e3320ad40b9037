use edw_reasoning_assistant::{
    api::start_server,
    config::{api_port_from_env, AppConfig, SnowflakeConfig},
    pipeline::AnalysisPipeline,
    warehouse::SnowflakeClient,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    let snowflake = SnowflakeConfig::from_env().map_err(|e| {
        eprintln!("Snowflake connection is not configured: {}", e);
        eprintln!("See .env.example for setup instructions");
        e
    })?;
    let api_port = api_port_from_env()?;

    info!("EDW Reasoning Assistant - API Server");
    info!(
        model = %config.model_name,
        database = %config.db_name,
        schema = %config.schema_name,
        account = %snowflake.account_url,
        "Configuration loaded"
    );

    let warehouse = Arc::new(SnowflakeClient::new(snowflake, &config)?);
    let pipeline = Arc::new(AnalysisPipeline::new(warehouse, &config));

    info!("Starting API server on port {}", api_port);

    start_server(pipeline, api_port).await?;

    Ok(())
}
