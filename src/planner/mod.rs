//! Sub-question planner
//!
//! The completion model decomposes a reasoning question into sub-questions,
//! which are then mapped onto typed analytics steps. An unusable model
//! response never fails the request: static plans are substituted instead
//! and recorded in `Plan::origin`.

use std::sync::Arc;
use tracing::{info, warn};

use crate::cortex::CompletionModel;
use crate::models::{Dimension, Plan, PlanOrigin, PlanStep, StepType, SubQuestion};
use crate::Result;

pub mod parse;
pub mod prompt;

pub use parse::{fallback_sub_questions, parse_sub_questions, SubQuestionOutcome};
pub use prompt::build_planning_prompt;

pub struct Planner {
    llm: Arc<dyn CompletionModel>,
}

impl Planner {
    pub fn new(llm: Arc<dyn CompletionModel>) -> Self {
        Self { llm }
    }

    /// Ask the model for sub-questions; fall back to the static set when the
    /// response cannot be used. Model call failures propagate.
    pub async fn generate_sub_questions(&self, question: &str) -> Result<SubQuestionOutcome> {
        let raw = self
            .llm
            .complete(&build_planning_prompt(question), None)
            .await?;

        Ok(parse_sub_questions(&raw))
    }

    pub async fn plan(&self, question: &str) -> Result<Plan> {
        let outcome = self.generate_sub_questions(question).await?;
        let plan = assemble_plan(question, outcome);

        if let PlanOrigin::SubQuestionFallback(reason) = &plan.origin {
            warn!("Planner response unusable, using static sub-questions: {}", reason);
        } else if plan.origin == PlanOrigin::StepFallback {
            warn!("Planner returned no sub-questions, using static steps");
        }

        info!(
            sub_questions = plan.sub_questions.len(),
            steps = plan.steps.len(),
            "Plan ready"
        );

        Ok(plan)
    }
}

/// Build the plan from a parse outcome, preserving sub-question order
pub fn assemble_plan(question: &str, outcome: SubQuestionOutcome) -> Plan {
    let (sub_questions, mut origin) = match outcome {
        SubQuestionOutcome::Parsed(list) => (list, PlanOrigin::Model),
        SubQuestionOutcome::Fallback(reason) => {
            (fallback_sub_questions(), PlanOrigin::SubQuestionFallback(reason))
        }
    };

    let mut steps = build_steps(&sub_questions);
    if steps.is_empty() {
        steps = fallback_steps();
        origin = PlanOrigin::StepFallback;
    }

    Plan {
        question: question.to_string(),
        sub_questions,
        steps,
        origin,
    }
}

pub fn build_steps(sub_questions: &[SubQuestion]) -> Vec<PlanStep> {
    sub_questions.iter().map(PlanStep::from).collect()
}

pub fn fallback_steps() -> Vec<PlanStep> {
    vec![
        PlanStep {
            id: "s1".to_string(),
            dimension: Dimension::Quarter,
            step_type: StepType::QuarterAnalytics,
            description: "Compare total revenue between the last two quarters.".to_string(),
            focus: "quarter-over-quarter change".to_string(),
        },
        PlanStep {
            id: "s2".to_string(),
            dimension: Dimension::Region,
            step_type: StepType::RegionAnalytics,
            description: "Identify which region has the weakest revenue trend.".to_string(),
            focus: "weakest region".to_string(),
        },
        PlanStep {
            id: "s3".to_string(),
            dimension: Dimension::Product,
            step_type: StepType::ProductAnalytics,
            description: "Identify which product line underperforms.".to_string(),
            focus: "weakest product".to_string(),
        },
    ]
}
