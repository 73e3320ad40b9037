//! Offline demo data
//!
//! A scripted warehouse holding a small revenue data set and canned Cortex
//! completions, so the CLI can run without Snowflake credentials.

use serde_json::{json, Value};

use crate::analytics::AnalyticsView;
use crate::config::AppConfig;
use crate::warehouse::{MockWarehouse, ResultSet};

const QUARTERS: [&str; 4] = ["2024-Q1", "2024-Q2", "2024-Q3", "2024-Q4"];

// Revenue in USD thousands, columns follow QUARTERS
const REGIONS: [(&str, [i64; 4]); 3] = [
    ("APAC", [2_800, 2_900, 3_000, 2_800]),
    ("EMEA", [4_200, 4_400, 4_500, 3_300]),
    ("NA", [5_000, 5_300, 5_400, 5_300]),
];

const PRODUCTS: [(&str, [i64; 4]); 3] = [
    ("Aerospace", [4_500, 4_700, 4_800, 3_800]),
    ("Automation", [4_800, 5_000, 5_100, 5_000]),
    ("Building Technologies", [2_700, 2_900, 3_000, 2_600]),
];

const DEMO_PLAN: &str = r#"[
  {"id": "sq1", "dimension": "quarter", "question": "How much did total revenue fall from 2024-Q3 to 2024-Q4?", "focus": "size of Q4 decline"},
  {"id": "sq2", "dimension": "region", "question": "Which region contributed most to the Q4 decline?", "focus": "find weakest region"},
  {"id": "sq3", "dimension": "product", "question": "Which product line drove the Q4 decline?", "focus": "find weakest product"}
]"#;

const DEMO_REASONING_ANSWER: &str = "Total revenue fell from 12.9M in 2024-Q3 to 11.4M in 2024-Q4, \
reversing two quarters of steady growth. The decline was concentrated in EMEA, which dropped \
from 4.5M to 3.3M while North America and APAC stayed broadly flat.\n\n\
By product, Aerospace accounts for almost the entire shortfall, falling from 4.8M to 3.8M, \
with a smaller dip in Building Technologies. Taken together, the evidence points to weaker \
Aerospace demand in EMEA as the main driver of the Q4 decrease.";

const DEMO_SIMPLE_ANSWER: &str =
    "Revenue in 2024-Q4 was 11,400 (USD thousands), down from 12,900 in 2024-Q3.";

fn quarter_totals() -> [i64; 4] {
    let mut totals = [0; 4];
    for (_, revenue) in REGIONS.iter() {
        for (total, value) in totals.iter_mut().zip(revenue.iter()) {
            *total += value;
        }
    }
    totals
}

fn breakdown(key: &str, members: &[(&str, [i64; 4])]) -> ResultSet {
    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (q, quarter) in QUARTERS.iter().enumerate() {
        for (name, revenue) in members {
            rows.push(vec![json!(quarter), json!(name), json!(revenue[q])]);
        }
    }

    ResultSet::new(
        vec!["QUARTER".to_string(), key.to_string(), "REVENUE_K".to_string()],
        rows,
    )
}

pub fn sample_tables() -> [(AnalyticsView, ResultSet); 3] {
    let totals = quarter_totals();
    let by_quarter = ResultSet::new(
        vec!["QUARTER".to_string(), "REVENUE_K".to_string()],
        QUARTERS
            .iter()
            .zip(totals.iter())
            .map(|(quarter, total)| vec![json!(quarter), json!(total)])
            .collect(),
    );

    [
        (AnalyticsView::ByQuarter, by_quarter),
        (AnalyticsView::ByRegion, breakdown("REGION", &REGIONS)),
        (AnalyticsView::ByProduct, breakdown("PRODUCT", &PRODUCTS)),
    ]
}

/// Scripted warehouse answering the configured views and the three prompts
pub fn demo_warehouse(config: &AppConfig) -> MockWarehouse {
    let mut warehouse = MockWarehouse::new();

    for (view, rows) in sample_tables() {
        let qualified = format!("{}.{}.{}", config.db_name, config.schema_name, view.view_name());
        warehouse = warehouse.with_result(&qualified, rows);
    }

    warehouse
        .with_result("analytics planner", ResultSet::scalar("COMPLETION", json!(DEMO_PLAN)))
        .with_result(
            "senior business analyst",
            ResultSet::scalar("COMPLETION", json!(DEMO_REASONING_ANSWER)),
        )
        .with_result(
            "business data assistant",
            ResultSet::scalar("COMPLETION", json!(DEMO_SIMPLE_ANSWER)),
        )
}
