use clap::Parser;
use edw_reasoning_assistant::{
    config::{AppConfig, SnowflakeConfig},
    demo::demo_warehouse,
    pipeline::AnalysisPipeline,
    render::{render_report, DEFAULT_PREVIEW_ROWS},
    warehouse::{SnowflakeClient, Warehouse},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Ask a business question about warehouse revenue analytics
#[derive(Debug, Parser)]
#[command(name = "edw-assistant", version, about)]
struct Cli {
    /// The question, e.g. "Why was revenue down last quarter?"
    question: String,

    /// Run against built-in sample data and canned completions
    #[arg(long)]
    demo: bool,

    /// Rows shown per analytics preview
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Completion model override
    #[arg(long, env = "CORTEX_MODEL")]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(model) = cli.model {
        config.model_name = model;
    }

    let warehouse: Arc<dyn Warehouse> = if cli.demo {
        info!("Running against demo data");
        Arc::new(demo_warehouse(&config))
    } else {
        Arc::new(SnowflakeClient::new(SnowflakeConfig::from_env()?, &config)?)
    };

    let pipeline = AnalysisPipeline::new(warehouse, &config);

    match pipeline.run(&cli.question).await {
        Ok(report) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(&report, cli.preview_rows));
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Analysis failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
