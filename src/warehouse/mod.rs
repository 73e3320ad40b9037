//! Warehouse query handle
//!
//! Every component that reads from the warehouse receives a
//! `Arc<dyn Warehouse>` explicitly; there is no ambient session.

use crate::error::AssistantError;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

pub mod snowflake;
pub use snowflake::SnowflakeClient;

/// Tabular result of one statement, columns in warehouse order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Single-cell result, the shape of a scalar `SELECT`
    pub fn scalar(column: &str, value: Value) -> Self {
        Self {
            columns: vec![column.to_string()],
            rows: vec![vec![value]],
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column of the first row
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }
}

/// Read-only statement execution against the warehouse
#[async_trait]
pub trait Warehouse: Send + Sync {
    async fn query(&self, sql: &str) -> Result<ResultSet>;
}

enum Scripted {
    Rows(ResultSet),
    Failure(String),
}

/// Scripted warehouse for demos and tests
///
/// Each statement is matched against the scripted patterns in insertion
/// order; the first pattern contained in the SQL text wins. Every statement
/// is recorded.
pub struct MockWarehouse {
    script: Vec<(String, Scripted)>,
    statements: Mutex<Vec<String>>,
}

impl MockWarehouse {
    pub fn new() -> Self {
        Self {
            script: Vec::new(),
            statements: Mutex::new(Vec::new()),
        }
    }

    pub fn with_result(mut self, pattern: &str, rows: ResultSet) -> Self {
        self.script.push((pattern.to_string(), Scripted::Rows(rows)));
        self
    }

    pub fn with_failure(mut self, pattern: &str, message: &str) -> Self {
        self.script
            .push((pattern.to_string(), Scripted::Failure(message.to_string())));
        self
    }

    /// Statements seen so far, oldest first
    pub async fn statements(&self) -> Vec<String> {
        self.statements.lock().await.clone()
    }
}

impl Default for MockWarehouse {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Warehouse for MockWarehouse {
    async fn query(&self, sql: &str) -> Result<ResultSet> {
        self.statements.lock().await.push(sql.to_string());

        let scripted = self
            .script
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, outcome)| outcome);

        match scripted {
            Some(Scripted::Rows(rows)) => {
                debug!(rows = rows.len(), "Mock warehouse answered statement");
                Ok(rows.clone())
            }
            Some(Scripted::Failure(message)) => Err(AssistantError::WarehouseError {
                status: 500,
                message: message.clone(),
            }),
            None => Err(AssistantError::WarehouseError {
                status: 404,
                message: "no scripted response for statement".to_string(),
            }),
        }
    }
}
