//! Evidence builder
//!
//! Turns the fetched tables into the JSON grounding context handed to the
//! completion model. Rows keep their order and every field is copied as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analytics::AnalyticsTables;
use crate::warehouse::ResultSet;
use crate::Result;

/// Column name to value, in column order
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Evidence {
    pub by_quarter: Vec<Record>,
    pub by_region: Vec<Record>,
    pub by_product: Vec<Record>,
}

impl Evidence {
    pub fn build(by_quarter: &ResultSet, by_region: &ResultSet, by_product: &ResultSet) -> Self {
        Self {
            by_quarter: to_records(by_quarter),
            by_region: to_records(by_region),
            by_product: to_records(by_product),
        }
    }

    pub fn from_tables(tables: &AnalyticsTables) -> Self {
        Self::build(&tables.by_quarter, &tables.by_region, &tables.by_product)
    }

    /// Compact JSON embedded into prompts
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn to_records(table: &ResultSet) -> Vec<Record> {
    table
        .rows
        .iter()
        .map(|row| {
            table
                .columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect::<Record>()
        })
        .collect()
}
