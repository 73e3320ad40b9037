//! Sub-question planning prompt

const PLANNER_INSTRUCTIONS: &str = r#"
You are a senior analytics planner for the Enterprise Data Warehouse.
Given a business question about revenue performance, generate 2–4 focused
sub-questions that help explain *why* metrics changed.

Rules:
- Output MUST be **valid JSON** only (no markdown, no backticks, no commentary).
- JSON structure: an array of objects, each with:
  - "id": a short identifier like "sq1", "sq2"
  - "dimension": one of "quarter", "region", "product", or "other"
  - "question": the natural language sub-question
  - "focus": a very short phrase (3–7 words) describing what this sub-question
    is trying to determine (e.g., "identify worst region", "compare Q3 vs Q4").
- Keep questions tight, business-oriented, and grounded in revenue analysis.
- Prefer 3 questions, one per dimension (quarter, region, product), when possible.
"#;

const SCHEMA_EXAMPLE: &str = r#"[
  {"id": "sq1", "dimension": "quarter", "question": "<natural language sub-question>", "focus": "<short phrase describing what this sub-question is trying to find>"},
  {"id": "sq2", "dimension": "region", "question": "<natural language sub-question>", "focus": "<short phrase describing what this sub-question is trying to find>"}
]
"#;

/// Instructions, a literal JSON example, then the user's question
pub fn build_planning_prompt(question: &str) -> String {
    format!(
        "{}\n\nNow respond ONLY with a JSON array, no extra text. Example schema:\n{}\n\
         Now produce the actual array for the user question above.\n\n\
         User question:\n{}\n",
        PLANNER_INSTRUCTIONS, SCHEMA_EXAMPLE, question
    )
}
