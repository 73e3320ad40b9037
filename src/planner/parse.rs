//! Normalization of the model's sub-question response

use serde_json::{Map, Value};

use crate::models::{Dimension, FallbackReason, SubQuestion};

/// Result of reading the model's sub-questions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubQuestionOutcome {
    /// The response was a JSON array; may be empty
    Parsed(Vec<SubQuestion>),
    /// The response was unusable and must be replaced
    Fallback(FallbackReason),
}

/// Strip whitespace and an enclosing markdown code fence
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            // Language tag runs to the end of the opening line, in any case
            let rest = match rest.split_once('\n') {
                Some((tag, body)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body,
                _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
            };
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

pub fn parse_sub_questions(raw: &str) -> SubQuestionOutcome {
    let parsed: Value = match serde_json::from_str(strip_code_fence(raw)) {
        Ok(value) => value,
        Err(e) => return SubQuestionOutcome::Fallback(FallbackReason::InvalidJson(e.to_string())),
    };

    let Value::Array(items) = parsed else {
        return SubQuestionOutcome::Fallback(FallbackReason::NotAnArray);
    };

    let mut cleaned = Vec::with_capacity(items.len());

    // Positions are 1-based and count dropped elements too.
    for (index, item) in items.iter().enumerate() {
        let position = index + 1;
        let Value::Object(fields) = item else {
            continue;
        };

        let question = match text_field(fields, "question") {
            Some(text) => text,
            None => {
                return SubQuestionOutcome::Fallback(FallbackReason::MalformedField {
                    position,
                    field: "question",
                })
            }
        };
        let focus = match text_field(fields, "focus") {
            Some(text) => text,
            None => {
                return SubQuestionOutcome::Fallback(FallbackReason::MalformedField {
                    position,
                    field: "focus",
                })
            }
        };

        cleaned.push(SubQuestion {
            id: fields
                .get("id")
                .and_then(truthy_id)
                .unwrap_or_else(|| format!("sq{}", position)),
            dimension: fields
                .get("dimension")
                .map(Dimension::from_value)
                .unwrap_or(Dimension::Other),
            question,
            focus,
        });
    }

    SubQuestionOutcome::Parsed(cleaned)
}

/// Missing → empty, string → trimmed, anything else → `None`
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key) {
        None => Some(String::new()),
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(_) => None,
    }
}

/// Ids that are empty, zero, false or null are replaced by the positional default
fn truthy_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Array(a) if !a.is_empty() => Some(value.to_string()),
        Value::Object(o) if !o.is_empty() => Some(value.to_string()),
        _ => None,
    }
}

pub fn fallback_sub_questions() -> Vec<SubQuestion> {
    vec![
        SubQuestion {
            id: "sq1".to_string(),
            dimension: Dimension::Quarter,
            question: "How did total revenue change between the last two quarters?".to_string(),
            focus: "compare quarter-over-quarter revenue".to_string(),
        },
        SubQuestion {
            id: "sq2".to_string(),
            dimension: Dimension::Region,
            question: "Which region showed the largest drop in revenue in the last quarter?"
                .to_string(),
            focus: "find weakest region".to_string(),
        },
        SubQuestion {
            id: "sq3".to_string(),
            dimension: Dimension::Product,
            question: "Which product line underperformed in the last quarter?".to_string(),
            focus: "find weakest product".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(raw: &str) -> Vec<SubQuestion> {
        match parse_sub_questions(raw) {
            SubQuestionOutcome::Parsed(list) => list,
            other => panic!("expected parsed outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_id_and_focus_defaulted() {
        let list = parsed(r#"[{"dimension":"region","question":"Q?"}]"#);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "sq1");
        assert_eq!(list[0].dimension, Dimension::Region);
        assert_eq!(list[0].question, "Q?");
        assert_eq!(list[0].focus, "");
    }

    #[test]
    fn test_whitespace_trimmed_and_dimension_defaulted() {
        let list = parsed(r#"[{"id":"a","question":"  Which region?  ","focus":"\tweakest\n"}]"#);
        assert_eq!(list[0].id, "a");
        assert_eq!(list[0].dimension, Dimension::Other);
        assert_eq!(list[0].question, "Which region?");
        assert_eq!(list[0].focus, "weakest");
    }

    #[test]
    fn test_non_objects_dropped_but_counted() {
        let list = parsed(r#"["noise", 7, {"dimension":"product","question":"P?","id":""}]"#);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "sq3");
        assert_eq!(list[0].dimension, Dimension::Product);
    }

    #[test]
    fn test_falsy_and_truthy_ids() {
        let list = parsed(r#"[{"id":0},{"id":null},{"id":false},{"id":12},{"id":"x"}]"#);
        let ids: Vec<&str> = list.iter().map(|sq| sq.id.as_str()).collect();
        assert_eq!(ids, vec!["sq1", "sq2", "sq3", "12", "x"]);
    }

    #[test]
    fn test_invalid_json_falls_back() {
        assert!(matches!(
            parse_sub_questions("not json"),
            SubQuestionOutcome::Fallback(FallbackReason::InvalidJson(_))
        ));
    }

    #[test]
    fn test_non_array_falls_back() {
        assert_eq!(
            parse_sub_questions(r#"{"id":"sq1"}"#),
            SubQuestionOutcome::Fallback(FallbackReason::NotAnArray)
        );
    }

    #[test]
    fn test_non_string_question_falls_back() {
        assert_eq!(
            parse_sub_questions(r#"[{"question":"ok"},{"question":null}]"#),
            SubQuestionOutcome::Fallback(FallbackReason::MalformedField {
                position: 2,
                field: "question"
            })
        );
    }

    #[test]
    fn test_code_fence_stripped() {
        let list = parsed("```json\n[{\"dimension\":\"quarter\",\"question\":\"Q?\"}]\n```");
        assert_eq!(list[0].dimension, Dimension::Quarter);
    }

    #[test]
    fn test_code_fence_tag_any_case() {
        let upper = parsed("```JSON\n[{\"dimension\":\"region\",\"question\":\"R?\"}]\n```");
        assert_eq!(upper[0].dimension, Dimension::Region);

        let bare = parsed("```\n[{\"question\":\"Q?\"}]\n```");
        assert_eq!(bare[0].question, "Q?");

        let inline = parsed("```Json [{\"question\":\"I?\"}]```");
        assert_eq!(inline[0].question, "I?");
    }

    #[test]
    fn test_empty_array_is_parsed_not_fallback() {
        assert_eq!(parse_sub_questions("[]"), SubQuestionOutcome::Parsed(vec![]));
    }

    #[test]
    fn test_fallback_set() {
        let list = fallback_sub_questions();
        let ids: Vec<&str> = list.iter().map(|sq| sq.id.as_str()).collect();
        let dims: Vec<Dimension> = list.iter().map(|sq| sq.dimension).collect();
        assert_eq!(ids, vec!["sq1", "sq2", "sq3"]);
        assert_eq!(dims, vec![Dimension::Quarter, Dimension::Region, Dimension::Product]);
    }
}
