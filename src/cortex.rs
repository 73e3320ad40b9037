//! Cortex completion client
//!
//! Calls `SNOWFLAKE.CORTEX.COMPLETE` through the warehouse handle. The prompt
//! travels inside a SQL string literal, so single quotes are doubled.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::AssistantError;
use crate::warehouse::Warehouse;
use crate::Result;

/// Hosted text completion
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Complete `prompt` with `model`, or with the configured default
    async fn complete(&self, prompt: &str, model: Option<&str>) -> Result<String>;
}

pub struct CortexClient {
    warehouse: Arc<dyn Warehouse>,
    default_model: String,
}

impl CortexClient {
    pub fn new(warehouse: Arc<dyn Warehouse>, default_model: impl Into<String>) -> Self {
        Self {
            warehouse,
            default_model: default_model.into(),
        }
    }
}

/// Double every `'` so the text can sit inside a single-quoted SQL literal.
/// Not a sanitizer.
pub fn escape_sql_literal(text: &str) -> String {
    text.replace('\'', "''")
}

pub fn completion_statement(model: &str, prompt: &str) -> String {
    format!(
        "SELECT SNOWFLAKE.CORTEX.COMPLETE('{}', '{}')",
        escape_sql_literal(model),
        escape_sql_literal(prompt)
    )
}

#[async_trait]
impl CompletionModel for CortexClient {
    async fn complete(&self, prompt: &str, model: Option<&str>) -> Result<String> {
        let model = model.unwrap_or(&self.default_model);

        info!(model = %model, prompt_chars = prompt.len(), "Calling Cortex COMPLETE");

        let rows = self
            .warehouse
            .query(&completion_statement(model, prompt))
            .await
            .map_err(|e| {
                error!("Cortex completion failed: {}", e);
                e
            })?;

        match rows.first_value() {
            Some(Value::String(text)) => Ok(text.clone()),
            Some(Value::Null) | None => Err(AssistantError::CompletionError(
                "Cortex returned no completion".to_string(),
            )),
            Some(other) => Err(AssistantError::CompletionError(format!(
                "Cortex returned a non-text completion: {}",
                other
            ))),
        }
    }
}
