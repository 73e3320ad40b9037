//! Analysis pipeline - one question, one linear pass
//!
//! ROUTE → FETCH → EVIDENCE → PLAN? → ANSWER

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analytics::AnalyticsFetcher;
use crate::classifier::QuestionClassifier;
use crate::config::AppConfig;
use crate::cortex::{CompletionModel, CortexClient};
use crate::error::AssistantError;
use crate::evidence::Evidence;
use crate::models::{AnalysisReport, Route};
use crate::planner::Planner;
use crate::reasoner::Reasoner;
use crate::warehouse::Warehouse;
use crate::Result;

pub struct AnalysisPipeline {
    fetcher: AnalyticsFetcher,
    planner: Planner,
    reasoner: Reasoner,
}

impl AnalysisPipeline {
    /// Wire every component to one warehouse handle; completions go through
    /// Cortex on the same handle
    pub fn new(warehouse: Arc<dyn Warehouse>, config: &AppConfig) -> Self {
        let llm: Arc<dyn CompletionModel> =
            Arc::new(CortexClient::new(warehouse.clone(), config.model_name.clone()));

        Self::with_components(
            AnalyticsFetcher::new(warehouse, config),
            Planner::new(llm.clone()),
            Reasoner::new(llm),
        )
    }

    pub fn with_components(fetcher: AnalyticsFetcher, planner: Planner, reasoner: Reasoner) -> Self {
        Self {
            fetcher,
            planner,
            reasoner,
        }
    }

    pub async fn run(&self, question: &str) -> Result<AnalysisReport> {
        let start = Instant::now();
        let question = question.trim();

        if question.is_empty() {
            return Err(AssistantError::InvalidQuestion(
                "question must not be empty".to_string(),
            ));
        }

        // 1. Route
        let route = QuestionClassifier::classify(question);
        info!(route = %route, "Question routed");

        // 2. Fetch
        let tables = self.fetcher.fetch().await?;

        // 3. Evidence
        let evidence = Evidence::from_tables(&tables);
        debug!(
            quarter_rows = evidence.by_quarter.len(),
            region_rows = evidence.by_region.len(),
            product_rows = evidence.by_product.len(),
            "Evidence built"
        );

        // 4. Plan + answer
        let (plan, answer) = match route {
            Route::Simple => {
                let answer = self.reasoner.simple_answer(question, &evidence).await?;
                (None, answer)
            }
            Route::Reasoning => {
                let plan = self.planner.plan(question).await?;
                let answer = self
                    .reasoner
                    .reasoning_answer(question, &plan, &evidence)
                    .await?;
                (Some(plan), answer)
            }
        };

        let execution_time_ms = start.elapsed().as_millis() as u64;
        info!(execution_time_ms, "Analysis complete");

        Ok(AnalysisReport {
            report_id: Uuid::new_v4(),
            question: question.to_string(),
            route,
            by_quarter: tables.by_quarter,
            by_region: tables.by_region,
            by_product: tables.by_product,
            plan_fallback: plan.as_ref().map(|p| p.origin.is_fallback()).unwrap_or(false),
            plan,
            answer,
            created_at: Utc::now(),
            execution_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_warehouse;
    use crate::warehouse::{MockWarehouse, ResultSet};
    use serde_json::json;

    #[tokio::test]
    async fn test_simple_question_skips_planning() {
        let config = AppConfig::default();
        let warehouse = Arc::new(demo_warehouse(&config));
        let pipeline = AnalysisPipeline::new(warehouse.clone(), &config);

        let report = pipeline.run("What was Q4 revenue?").await.unwrap();

        assert_eq!(report.route, Route::Simple);
        assert!(report.plan.is_none());
        assert!(!report.plan_fallback);
        assert!(!report.answer.is_empty());

        let statements = warehouse.statements().await;
        assert_eq!(statements.len(), 4);
        assert!(statements[3].contains("business data assistant"));
        assert!(statements.iter().all(|s| !s.contains("analytics planner")));
    }

    #[tokio::test]
    async fn test_reasoning_question_plans_then_answers() {
        let config = AppConfig::default();
        let warehouse = Arc::new(demo_warehouse(&config));
        let pipeline = AnalysisPipeline::new(warehouse.clone(), &config);

        let report = pipeline.run("Why was revenue down last quarter?").await.unwrap();

        assert_eq!(report.route, Route::Reasoning);
        let plan = report.plan.expect("reasoning route produces a plan");
        assert_eq!(plan.steps.len(), plan.sub_questions.len());
        assert!(!report.plan_fallback);

        let statements = warehouse.statements().await;
        assert_eq!(statements.len(), 5);
        assert!(statements[3].contains("analytics planner"));
        assert!(statements[4].contains("senior business analyst"));
    }

    #[tokio::test]
    async fn test_warehouse_failure_is_fatal() {
        let config = AppConfig::default();
        let warehouse = Arc::new(MockWarehouse::new().with_failure("V_REVENUE", "warehouse suspended"));
        let pipeline = AnalysisPipeline::new(warehouse, &config);

        let err = pipeline.run("What was Q4 revenue?").await.unwrap_err();
        assert!(err.to_string().contains("warehouse suspended"));
    }

    #[tokio::test]
    async fn test_unusable_plan_marks_report() {
        let config = AppConfig::default();
        let warehouse = Arc::new(
            MockWarehouse::new()
                .with_result("V_REVENUE", ResultSet::default())
                .with_result("analytics planner", ResultSet::scalar("C", json!("Sure! Here you go")))
                .with_result("CORTEX.COMPLETE", ResultSet::scalar("C", json!("Revenue fell."))),
        );
        let pipeline = AnalysisPipeline::new(warehouse, &config);

        let report = pipeline.run("explain the decline").await.unwrap();
        assert!(report.plan_fallback);
        assert_eq!(report.answer, "Revenue fell.");
    }

    #[tokio::test]
    async fn test_blank_question_rejected() {
        let config = AppConfig::default();
        let warehouse = Arc::new(MockWarehouse::new());
        let pipeline = AnalysisPipeline::new(warehouse.clone(), &config);

        let result = pipeline.run("   ").await;
        assert!(matches!(result, Err(AssistantError::InvalidQuestion(_))));
        assert!(warehouse.statements().await.is_empty());
    }
}
