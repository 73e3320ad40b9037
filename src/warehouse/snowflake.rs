//! Snowflake SQL API client
//!
//! Submits statements to `/api/v2/statements` and converts the string-encoded
//! `jsonv2` result partitions into typed JSON values.
//! Uses a long-lived reqwest::Client for connection pooling.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveDate, NaiveTime};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::{ResultSet, Warehouse};
use crate::config::{AppConfig, SnowflakeConfig};
use crate::error::AssistantError;
use crate::Result;

const STATEMENTS_PATH: &str = "/api/v2/statements";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Reusable SQL API client (connection-pooled)
pub struct SnowflakeClient {
    client: Client,
    config: SnowflakeConfig,
    database: String,
    schema: String,
    poll_interval: Duration,
}

impl SnowflakeClient {
    /// Statements run with the analytics database and schema as session context
    pub fn new(config: SnowflakeConfig, app: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(config.statement_timeout + Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            config,
            database: app.db_name.clone(),
            schema: app.schema_name.clone(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.config.token)
            .header(
                "X-Snowflake-Authorization-Token-Type",
                self.config.token_type.header_value(),
            )
            .header("Accept", "application/json")
            .header("User-Agent", concat!("edw-reasoning-assistant/", env!("CARGO_PKG_VERSION")))
    }

    async fn submit(&self, sql: &str) -> Result<(StatusCode, StatementResponse)> {
        let url = format!("{}{}", self.config.account_url, STATEMENTS_PATH);
        let body = StatementRequest {
            statement: sql,
            timeout: self.config.statement_timeout.as_secs(),
            database: &self.database,
            schema: &self.schema,
            warehouse: self.config.warehouse.as_deref(),
            role: self.config.role.as_deref(),
        };

        let response = self
            .authorize(self.client.post(&url))
            .query(&[("requestId", Uuid::new_v4().to_string())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Snowflake statement request failed: {}", e);
                e
            })?;

        read_response(response).await
    }

    async fn get(&self, path_and_query: &str) -> Result<(StatusCode, StatementResponse)> {
        let url = format!("{}{}", self.config.account_url, path_and_query);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                error!("Snowflake status request failed: {}", e);
                e
            })?;

        read_response(response).await
    }

    /// Poll the status URL while the statement is still executing
    async fn await_completion(
        &self,
        mut status: StatusCode,
        mut response: StatementResponse,
    ) -> Result<StatementResponse> {
        let started = Instant::now();

        while status == StatusCode::ACCEPTED {
            if started.elapsed() >= self.config.statement_timeout {
                return Err(AssistantError::StatementTimeout(
                    self.config.statement_timeout.as_secs(),
                ));
            }

            let status_url = response.statement_status_url.clone().ok_or_else(|| {
                AssistantError::ResponseFormatError(
                    "statement accepted without a status URL".to_string(),
                )
            })?;

            debug!(status_url = %status_url, "Statement still running");
            tokio::time::sleep(self.poll_interval).await;

            let (next_status, next_response) = self.get(&status_url).await?;
            status = next_status;
            response = next_response;
        }

        Ok(response)
    }

    async fn fetch_partition(&self, handle: &str, partition: usize) -> Result<Vec<Vec<Option<String>>>> {
        let path = format!("{}/{}?partition={}", STATEMENTS_PATH, handle, partition);
        let (_, response) = self.get(&path).await?;
        Ok(response.data)
    }
}

#[async_trait]
impl Warehouse for SnowflakeClient {
    async fn query(&self, sql: &str) -> Result<ResultSet> {
        debug!(statement = %sql, "Submitting statement to Snowflake");

        let (status, response) = self.submit(sql).await?;
        let mut response = self.await_completion(status, response).await?;

        let meta = response.result_set_meta_data.take().ok_or_else(|| {
            AssistantError::ResponseFormatError("result set metadata missing".to_string())
        })?;

        let mut raw_rows = std::mem::take(&mut response.data);

        if meta.partition_info.len() > 1 {
            let handle = response.statement_handle.as_deref().ok_or_else(|| {
                AssistantError::ResponseFormatError(
                    "partitioned result without a statement handle".to_string(),
                )
            })?;

            for partition in 1..meta.partition_info.len() {
                raw_rows.extend(self.fetch_partition(handle, partition).await?);
            }
        }

        let rows = raw_rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(meta.row_type.iter())
                    .map(|(cell, column)| convert_cell(cell, column))
                    .collect()
            })
            .collect::<Vec<Vec<Value>>>();

        if let Some(expected) = meta.num_rows {
            if rows.len() as u64 != expected {
                return Err(AssistantError::ResponseFormatError(format!(
                    "expected {} rows across partitions, received {}",
                    expected,
                    rows.len()
                )));
            }
        }

        info!(rows = rows.len(), "Snowflake statement completed");

        Ok(ResultSet {
            columns: meta.row_type.into_iter().map(|c| c.name).collect(),
            rows,
        })
    }
}

async fn read_response(response: reqwest::Response) -> Result<(StatusCode, StatementResponse)> {
    let status = response.status();
    let text = response.text().await?;

    if status != StatusCode::OK && status != StatusCode::ACCEPTED {
        let message = serde_json::from_str::<StatementResponse>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or(text);
        error!("Snowflake SQL API error response ({}): {}", status, message);
        return Err(AssistantError::WarehouseError {
            status: status.as_u16(),
            message,
        });
    }

    let body = serde_json::from_str::<StatementResponse>(&text).map_err(|e| {
        error!("Failed to parse Snowflake response: {}", e);
        AssistantError::ResponseFormatError(format!("Snowflake response parse error: {}", e))
    })?;

    Ok((status, body))
}

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    timeout: u64,
    database: &'a str,
    schema: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
    message: Option<String>,
    statement_handle: Option<String>,
    statement_status_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetaData {
    row_type: Vec<RowType>,
    num_rows: Option<u64>,
    #[serde(default)]
    partition_info: Vec<IgnoredAny>,
}

#[derive(Debug, Deserialize)]
struct RowType {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    scale: Option<i64>,
}

/// Map one string-encoded cell to JSON according to its column type.
/// Values that do not parse as their declared type are kept as text.
fn convert_cell(raw: Option<String>, column: &RowType) -> Value {
    let Some(raw) = raw else {
        return Value::Null;
    };

    let converted = match column.type_name.to_lowercase().as_str() {
        "fixed" if column.scale.unwrap_or(0) == 0 => raw.parse::<i64>().ok().map(Value::from),
        "fixed" | "real" => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        "boolean" => match raw.to_lowercase().as_str() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        "date" => raw
            .parse::<i64>()
            .ok()
            .and_then(date_from_epoch_days)
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
        "time" => time_from_seconds(&raw).map(|t| Value::String(t.format("%H:%M:%S%.f").to_string())),
        "timestamp_ntz" | "timestamp_ltz" => epoch_to_datetime(&raw, 0)
            .map(|dt| Value::String(dt.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        "timestamp_tz" => timestamp_tz(&raw).map(|dt| Value::String(dt.to_rfc3339())),
        _ => None,
    };

    converted.unwrap_or(Value::String(raw))
}

fn date_from_epoch_days(days: i64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(ChronoDuration::try_days(days)?)
}

/// Split `"<secs>.<fraction>"` into whole seconds and nanoseconds
fn split_epoch(raw: &str) -> Option<(i64, u32)> {
    let (whole, fraction) = match raw.split_once('.') {
        Some((w, f)) => (w, f),
        None => (raw, ""),
    };

    let mut secs: i64 = whole.parse().ok()?;
    let mut nanos: u32 = if fraction.is_empty() {
        0
    } else {
        let digits: String = fraction.chars().take(9).collect();
        format!("{:0<9}", digits).parse().ok()?
    };

    if whole.starts_with('-') && nanos > 0 {
        secs -= 1;
        nanos = 1_000_000_000 - nanos;
    }

    Some((secs, nanos))
}

fn epoch_to_datetime(raw: &str, offset_minutes: i32) -> Option<DateTime<FixedOffset>> {
    let (secs, nanos) = split_epoch(raw)?;
    let utc = DateTime::from_timestamp(secs, nanos)?;
    let offset = FixedOffset::east_opt(offset_minutes * 60)?;
    Some(utc.with_timezone(&offset))
}

/// `TIMESTAMP_TZ` cells carry `"<epoch> <offset minutes + 1440>"`
fn timestamp_tz(raw: &str) -> Option<DateTime<FixedOffset>> {
    let mut parts = raw.split_whitespace();
    let epoch = parts.next()?;
    let offset = match parts.next() {
        Some(encoded) => encoded.parse::<i32>().ok()? - 1440,
        None => 0,
    };
    epoch_to_datetime(epoch, offset)
}

fn time_from_seconds(raw: &str) -> Option<NaiveTime> {
    let (secs, nanos) = split_epoch(raw)?;
    NaiveTime::from_num_seconds_from_midnight_opt(u32::try_from(secs).ok()?, nanos)
}
