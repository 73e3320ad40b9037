//! Question Classifier
//!
//! Routes a business question to one of two answer paths:
//! - Simple: direct lookups (e.g., "what was Q4 revenue?")
//! - Reasoning: causal questions that need planning (e.g., "why was revenue down?")

use crate::models::Route;

/// Static keyword list, zero allocation
const REASONING_KEYWORDS: &[&str] = &["why", "cause", "reason", "driver", "explain", "because"];

/// Question classifier
pub struct QuestionClassifier;

impl QuestionClassifier {
    /// Substring match on the lower-cased question; empty input is simple
    pub fn classify(question: &str) -> Route {
        let lowered = question.to_lowercase();

        if REASONING_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            Route::Reasoning
        } else {
            Route::Simple
        }
    }
}
