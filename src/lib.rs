//! EDW Reasoning Assistant
//!
//! Answers free-text business questions over a cloud data warehouse:
//! - Routes each question to a simple or a reasoning path
//! - Grounds every answer in three precomputed revenue views
//! - Uses the warehouse's hosted completion model for planning and answers
//! - Falls back to static plans when the model's plan is unusable
//!
//! PIPELINE:
//! ROUTE → FETCH → EVIDENCE → PLAN? → ANSWER

pub mod analytics;
pub mod api;
pub mod classifier;
pub mod config;
pub mod cortex;
pub mod demo;
pub mod error;
pub mod evidence;
pub mod models;
pub mod pipeline;
pub mod planner;
pub mod reasoner;
pub mod render;
pub mod warehouse;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::QuestionClassifier;
pub use pipeline::AnalysisPipeline;
