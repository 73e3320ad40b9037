//! Terminal rendering of an analysis report

use owo_colors::OwoColorize;
use serde_json::Value;
use std::fmt::Write;

use crate::analytics::AnalyticsView;
use crate::models::{AnalysisReport, Plan, Route};
use crate::warehouse::ResultSet;

pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Render the report in display order: routing, previews, plan, answer
pub fn render_report(report: &AnalysisReport, preview_rows: usize) -> String {
    let mut out = String::new();

    heading(&mut out, "Step 1 — Routing");
    let _ = writeln!(out, "Route: {}", report.route.to_string().bold());
    out.push('\n');

    heading(&mut out, "Step 2 — Warehouse Analytics");
    let previews = [
        (AnalyticsView::ByQuarter, &report.by_quarter),
        (AnalyticsView::ByRegion, &report.by_region),
        (AnalyticsView::ByProduct, &report.by_product),
    ];
    for (view, table) in previews {
        let _ = writeln!(out, "Preview: {}", view.title().cyan());
        out.push_str(&render_table(table, preview_rows));
        out.push('\n');
    }

    match (report.route, &report.plan) {
        (Route::Reasoning, Some(plan)) => {
            let _ = writeln!(
                out,
                "{}",
                "Reasoning question detected: using planning + multi-step reasoning.".dimmed()
            );
            out.push('\n');
            heading(&mut out, "Step 3 — Planning");
            out.push_str(&render_plan(plan));
            if report.plan_fallback {
                let _ = writeln!(out, "{}", "[NOTE] model plan unusable, static plan shown".yellow());
            }
            out.push('\n');
            heading(&mut out, "Step 4 — AI Reasoning");
        }
        _ => {
            let _ = writeln!(
                out,
                "{}",
                "Simple question detected: using direct analytics with no explicit planning.".dimmed()
            );
            out.push('\n');
            heading(&mut out, "Step 3 — Direct AI Answer");
        }
    }

    out.push('\n');
    heading(&mut out, "Final AI Explanation");
    let _ = writeln!(out, "{}", report.answer.trim());
    out.push('\n');
    let _ = writeln!(
        out,
        "{}",
        format!("report {} • {} ms", report.report_id, report.execution_time_ms).dimmed()
    );

    out
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", title.bold().underline());
}

pub fn render_plan(plan: &Plan) -> String {
    let mut out = String::new();

    if !plan.steps.is_empty() {
        out.push_str("Planned Steps:\n");
        for step in &plan.steps {
            let _ = writeln!(out, "  - {} [{}] – {}", step.id, step.dimension, step.description);
        }
    }

    if !plan.sub_questions.is_empty() {
        out.push_str("Generated Sub-Questions:\n");
        for sq in &plan.sub_questions {
            let _ = writeln!(
                out,
                "  - {} ({}): {} — {}",
                sq.id, sq.dimension, sq.question, sq.focus
            );
        }
    }

    out
}

/// Plain fixed-width table of the first `max_rows` rows
pub fn render_table(table: &ResultSet, max_rows: usize) -> String {
    if table.columns.is_empty() {
        return "  (no columns)\n".to_string();
    }

    let shown: Vec<Vec<String>> = table
        .rows
        .iter()
        .take(max_rows)
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &shown {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &table.columns, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &shown {
        push_row(&mut out, row, &widths);
    }

    if table.len() > shown.len() {
        let _ = writeln!(out, "  … {} more row(s)", table.len() - shown.len());
    }
    if table.is_empty() {
        out.push_str("  (no rows)\n");
    }

    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    let _ = writeln!(out, "  {}", padded.join(" | "));
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dimension, PlanOrigin, PlanStep, StepType, SubQuestion};
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn table() -> ResultSet {
        ResultSet::new(
            vec!["QUARTER".to_string(), "REVENUE_K".to_string()],
            vec![
                vec![json!("2024-Q1"), json!(12000)],
                vec![json!("2024-Q2"), Value::Null],
                vec![json!("2024-Q3"), json!(12900)],
            ],
        )
    }

    #[test]
    fn test_table_truncates_and_aligns() {
        let text = render_table(&table(), 2);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "  QUARTER | REVENUE_K");
        assert_eq!(lines[1], "  ------- | ---------");
        assert_eq!(lines[2], "  2024-Q1 | 12000    ");
        assert_eq!(lines[3], "  2024-Q2 | NULL     ");
        assert!(lines[4].contains("1 more row(s)"));
    }

    #[test]
    fn test_empty_table() {
        let empty = ResultSet::new(vec!["QUARTER".to_string()], vec![]);
        assert!(render_table(&empty, 5).contains("(no rows)"));
    }

    #[test]
    fn test_plan_listing() {
        let plan = Plan {
            question: "why?".to_string(),
            sub_questions: vec![SubQuestion {
                id: "sq1".to_string(),
                dimension: Dimension::Region,
                question: "Which region fell?".to_string(),
                focus: "find weakest region".to_string(),
            }],
            steps: vec![PlanStep {
                id: "sq1".to_string(),
                dimension: Dimension::Region,
                step_type: StepType::RegionAnalytics,
                description: "Which region fell?".to_string(),
                focus: "find weakest region".to_string(),
            }],
            origin: PlanOrigin::Model,
        };

        let text = render_plan(&plan);
        assert!(text.contains("  - sq1 [region] – Which region fell?"));
        assert!(text.contains("  - sq1 (region): Which region fell? — find weakest region"));
    }

    #[test]
    fn test_simple_report_has_no_planning_section() {
        let report = AnalysisReport {
            report_id: Uuid::new_v4(),
            question: "What was Q1 revenue?".to_string(),
            route: Route::Simple,
            by_quarter: table(),
            by_region: ResultSet::default(),
            by_product: ResultSet::default(),
            plan: None,
            plan_fallback: false,
            answer: "Q1 revenue was 12,000.\n".to_string(),
            created_at: Utc::now(),
            execution_time_ms: 3,
        };

        let text = render_report(&report, DEFAULT_PREVIEW_ROWS);
        assert!(text.contains("Direct AI Answer"));
        assert!(!text.contains("Planning"));
        assert!(text.contains("Q1 revenue was 12,000."));
    }
}
