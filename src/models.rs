//! Core data models for the reasoning assistant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::warehouse::ResultSet;

//
// ================= Enums =================
//

/// How a question is answered
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// One-shot answer straight from the evidence
    Simple,
    /// Sub-question planning followed by a multi-paragraph explanation
    Reasoning,
}

/// Analytic dimension a sub-question is about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Quarter,
    Region,
    Product,
    #[serde(other)]
    Other,
}

impl Dimension {
    /// Exact, case-sensitive match on the three known names
    pub fn from_name(name: &str) -> Self {
        match name {
            "quarter" => Dimension::Quarter,
            "region" => Dimension::Region,
            "product" => Dimension::Product,
            _ => Dimension::Other,
        }
    }

    /// Non-string values (numbers, null, objects) are not a known dimension
    pub fn from_value(value: &Value) -> Self {
        value.as_str().map(Self::from_name).unwrap_or(Dimension::Other)
    }

    pub fn step_type(&self) -> StepType {
        match self {
            Dimension::Quarter => StepType::QuarterAnalytics,
            Dimension::Region => StepType::RegionAnalytics,
            Dimension::Product => StepType::ProductAnalytics,
            Dimension::Other => StepType::GenericAnalytics,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    QuarterAnalytics,
    RegionAnalytics,
    ProductAnalytics,
    GenericAnalytics,
}

//
// ================= Plan =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubQuestion {
    pub id: String,
    pub dimension: Dimension,
    pub question: String,
    pub focus: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanStep {
    pub id: String,
    pub dimension: Dimension,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub description: String,
    pub focus: String,
}

impl From<&SubQuestion> for PlanStep {
    fn from(sq: &SubQuestion) -> Self {
        Self {
            id: sq.id.clone(),
            dimension: sq.dimension,
            step_type: sq.dimension.step_type(),
            description: sq.question.clone(),
            focus: sq.focus.clone(),
        }
    }
}

/// Why the model's sub-questions were discarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    InvalidJson(String),
    NotAnArray,
    MalformedField { position: usize, field: &'static str },
}

/// Where the content of a plan came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlanOrigin {
    /// Sub-questions and steps derived from the model response
    #[default]
    Model,
    /// The model response was unusable; static sub-questions substituted
    SubQuestionFallback(FallbackReason),
    /// The model returned no sub-questions; static steps substituted
    StepFallback,
}

impl PlanOrigin {
    pub fn is_fallback(&self) -> bool {
        !matches!(self, PlanOrigin::Model)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    pub question: String,
    pub sub_questions: Vec<SubQuestion>,
    pub steps: Vec<PlanStep>,
    /// Not part of the prompt payload
    #[serde(skip)]
    pub origin: PlanOrigin,
}

//
// ================= Report =================
//

/// Everything one analysis request produced, in display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report_id: Uuid,
    pub question: String,
    pub route: Route,
    pub by_quarter: ResultSet,
    pub by_region: ResultSet,
    pub by_product: ResultSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub plan_fallback: bool,
    pub answer: String,
    pub created_at: DateTime<Utc>,
    pub execution_time_ms: u64,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Route::Simple => "simple",
            Route::Reasoning => "reasoning",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Dimension::Quarter => "quarter",
            Dimension::Region => "region",
            Dimension::Product => "product",
            Dimension::Other => "other",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepType::QuarterAnalytics => "quarter_analytics",
            StepType::RegionAnalytics => "region_analytics",
            StepType::ProductAnalytics => "product_analytics",
            StepType::GenericAnalytics => "generic_analytics",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::InvalidJson(e) => write!(f, "response is not valid JSON: {}", e),
            FallbackReason::NotAnArray => write!(f, "response is not a JSON array"),
            FallbackReason::MalformedField { position, field } => {
                write!(f, "element {} has a non-string '{}'", position, field)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dimension_to_step_type_mapping() {
        assert_eq!(Dimension::Quarter.step_type(), StepType::QuarterAnalytics);
        assert_eq!(Dimension::Region.step_type(), StepType::RegionAnalytics);
        assert_eq!(Dimension::Product.step_type(), StepType::ProductAnalytics);
        assert_eq!(Dimension::Other.step_type(), StepType::GenericAnalytics);

        for name in ["customer", "Quarter", "", "channel"] {
            assert_eq!(Dimension::from_name(name).step_type(), StepType::GenericAnalytics);
        }
    }

    #[test]
    fn test_dimension_from_non_string_value() {
        assert_eq!(Dimension::from_value(&json!(3)), Dimension::Other);
        assert_eq!(Dimension::from_value(&Value::Null), Dimension::Other);
        assert_eq!(Dimension::from_value(&json!("region")), Dimension::Region);
    }

    #[test]
    fn test_plan_step_serializes_type_field() {
        let sq = SubQuestion {
            id: "sq2".to_string(),
            dimension: Dimension::Region,
            question: "Which region dropped?".to_string(),
            focus: "find weakest region".to_string(),
        };
        let step = PlanStep::from(&sq);
        let value = serde_json::to_value(&step).unwrap();

        assert_eq!(value["type"], "region_analytics");
        assert_eq!(value["dimension"], "region");
        assert_eq!(value["description"], "Which region dropped?");
    }

    #[test]
    fn test_plan_origin_not_serialized() {
        let plan = Plan {
            question: "why?".to_string(),
            sub_questions: vec![],
            steps: vec![],
            origin: PlanOrigin::StepFallback,
        };
        let value = serde_json::to_value(&plan).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["question", "sub_questions", "steps"]);
    }

    #[test]
    fn test_unknown_dimension_deserializes_as_other() {
        let sq: SubQuestion = serde_json::from_value(json!({
            "id": "sq1",
            "dimension": "customer",
            "question": "q",
            "focus": "f"
        }))
        .unwrap();
        assert_eq!(sq.dimension, Dimension::Other);
    }
}
