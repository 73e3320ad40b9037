//! Answer generation
//!
//! Two independent prompt templates, each embedding the evidence as JSON.
//! The completion text is returned untouched.

use std::sync::Arc;
use tracing::info;

use crate::cortex::CompletionModel;
use crate::evidence::Evidence;
use crate::models::Plan;
use crate::Result;

pub struct Reasoner {
    llm: Arc<dyn CompletionModel>,
}

impl Reasoner {
    pub fn new(llm: Arc<dyn CompletionModel>) -> Self {
        Self { llm }
    }

    /// One-shot answer: a number and a short sentence
    pub async fn simple_answer(&self, question: &str, evidence: &Evidence) -> Result<String> {
        let prompt = build_simple_prompt(question, evidence)?;
        info!("Requesting direct answer");
        self.llm.complete(&prompt, None).await
    }

    /// Plan-guided explanation in plain paragraphs
    pub async fn reasoning_answer(
        &self,
        question: &str,
        plan: &Plan,
        evidence: &Evidence,
    ) -> Result<String> {
        let prompt = build_reasoning_prompt(question, plan, evidence)?;
        info!(steps = plan.steps.len(), "Requesting reasoning answer");
        self.llm.complete(&prompt, None).await
    }
}

pub fn build_simple_prompt(question: &str, evidence: &Evidence) -> Result<String> {
    Ok(format!(
        r#"You are a business data assistant answering straightforward questions.

User question:
{question}

You are given precomputed analytics as JSON:
{evidence}

Instructions:
- If the user asks for a specific value (e.g., revenue for a quarter or product),
  answer with that number and one short explanatory sentence.
- Do NOT describe your internal reasoning steps.
- Do NOT list a multi-step plan.
- Base your answer only on the data provided.
"#,
        question = question,
        evidence = evidence.to_json()?,
    ))
}

pub fn build_reasoning_prompt(question: &str, plan: &Plan, evidence: &Evidence) -> Result<String> {
    Ok(format!(
        r#"You are a senior business analyst supporting the Enterprise Data Warehouse.

User question:
{question}

Planned steps (JSON):
{plan}

Summarized evidence from analytics (JSON):
{evidence}

Write a professional, concise explanation that:
- Describes what happened (trends by quarter, region, and product).
- Highlights the main drivers of any revenue changes.
- Uses only the information in the evidence; do not hallucinate extra data.
- Avoids bullet points; answer in 1–3 paragraphs of plain text.
"#,
        question = question,
        plan = serde_json::to_string(plan)?,
        evidence = evidence.to_json()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{assemble_plan, SubQuestionOutcome};
    use crate::warehouse::ResultSet;
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;

    struct EchoModel {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionModel for EchoModel {
        async fn complete(&self, prompt: &str, _model: Option<&str>) -> Result<String> {
            self.prompts.lock().await.push(prompt.to_string());
            Ok("  Q4 revenue was 120.  ".to_string())
        }
    }

    fn sample_evidence() -> Evidence {
        let quarter = ResultSet::new(
            vec!["QUARTER".to_string(), "REVENUE".to_string()],
            vec![vec![json!("2024-Q4"), json!(120)]],
        );
        Evidence::build(&quarter, &ResultSet::default(), &ResultSet::default())
    }

    #[test]
    fn test_simple_prompt_embeds_evidence_only() {
        let evidence = sample_evidence();
        let prompt = build_simple_prompt("What was Q4 revenue?", &evidence).unwrap();

        assert!(prompt.contains("What was Q4 revenue?"));
        assert!(prompt.contains(&evidence.to_json().unwrap()));
        assert!(prompt.contains("Do NOT list a multi-step plan."));
        assert!(!prompt.contains("Planned steps"));
        assert!(!prompt.contains("bullet points"));
    }

    #[test]
    fn test_reasoning_prompt_embeds_plan_and_evidence() {
        let evidence = sample_evidence();
        let plan = assemble_plan("Why did Q4 drop?", SubQuestionOutcome::Parsed(vec![]));
        let prompt = build_reasoning_prompt("Why did Q4 drop?", &plan, &evidence).unwrap();

        assert!(prompt.contains(&evidence.to_json().unwrap()));
        assert!(prompt.contains(&serde_json::to_string(&plan).unwrap()));
        assert!(prompt.contains("quarter_analytics"));
        assert!(prompt.contains("Avoids bullet points"));
        assert!(!prompt.contains("Do NOT list a multi-step plan."));
    }

    #[tokio::test]
    async fn test_answers_returned_verbatim() {
        let model = Arc::new(EchoModel {
            prompts: Mutex::new(Vec::new()),
        });
        let reasoner = Reasoner::new(model.clone());
        let evidence = sample_evidence();

        let answer = reasoner.simple_answer("What was Q4 revenue?", &evidence).await.unwrap();
        assert_eq!(answer, "  Q4 revenue was 120.  ");

        let plan = assemble_plan("why?", SubQuestionOutcome::Parsed(vec![]));
        reasoner.reasoning_answer("why?", &plan, &evidence).await.unwrap();

        let prompts = model.prompts.lock().await;
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].starts_with("You are a business data assistant"));
        assert!(prompts[1].starts_with("You are a senior business analyst"));
    }
}
