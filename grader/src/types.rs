//! # Types Module
//!
//! This module defines the core result structures produced by a grading run: one
//! [`KnowledgePointResult`] per operation point, one [`QuestionScoreResult`] per question, and a
//! [`ScoringResult`] rolling them up per module or per submission. All of them are created fresh
//! for each grading invocation and are serializable for the caller to persist or display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Result of detecting a single knowledge point against the submission.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgePointResult {
    /// Id of the question this point belongs to.
    #[serde(default)]
    pub question_id: Option<String>,
    /// Id of the operation point that was checked.
    #[serde(default)]
    pub operation_point_id: Option<String>,
    /// Name of the knowledge point, for display.
    #[serde(default)]
    pub knowledge_point_name: String,
    /// Operation-type tag that was dispatched on.
    #[serde(default)]
    pub knowledge_point_type: String,
    /// Maximum score configured for this point.
    #[serde(default)]
    pub total_score: f64,
    /// Score actually achieved.
    #[serde(default)]
    pub achieved_score: f64,
    /// Whether the check passed in full.
    #[serde(default)]
    pub is_correct: bool,
    /// Fractional credit (0–1) when the detector supports partial scoring;
    /// overrides the all-or-nothing rule during aggregation.
    #[serde(default)]
    pub partial_credit: Option<f64>,
    /// Free-text diagnostic detail about what was observed.
    #[serde(default)]
    pub details: String,
    /// Expected value, when the check compares concrete values.
    #[serde(default)]
    pub expected_value: Option<String>,
    /// Observed value, when the check compares concrete values.
    #[serde(default)]
    pub actual_value: Option<String>,
    /// Set only when detection itself failed (unreachable path, timeout, bad
    /// parameters), as opposed to the check legitimately not passing.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Normalized parameters the check ran with.
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl KnowledgePointResult {
    /// A zero-score result carrying a detection failure message.
    pub fn failed(operation_type: &str, message: impl Into<String>) -> Self {
        KnowledgePointResult {
            knowledge_point_type: operation_type.to_string(),
            is_correct: false,
            error_message: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Per-question rollup within a module result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionScoreResult {
    pub question_id: String,
    pub question_title: String,
    pub total_score: f64,
    pub achieved_score: f64,
    pub is_correct: bool,
}

/// Aggregate result for one module, or for a whole submission when combined.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResult {
    /// Module name when this result covers one module; exam name when combined.
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub total_score: f64,
    #[serde(default)]
    pub achieved_score: f64,
    #[serde(default)]
    pub is_success: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub question_results: Vec<QuestionScoreResult>,
    #[serde(default)]
    pub knowledge_point_results: Vec<KnowledgePointResult>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl ScoringResult {
    /// An empty result stamped with the current time, to be filled in.
    pub fn started(subject: impl Into<String>) -> Self {
        let now = Utc::now();
        ScoringResult {
            subject: subject.into(),
            total_score: 0.0,
            achieved_score: 0.0,
            is_success: false,
            error_message: None,
            question_results: Vec::new(),
            knowledge_point_results: Vec::new(),
            start_time: now,
            end_time: now,
        }
    }

    /// Achieved over total, defined as 0 when the total is 0.
    pub fn score_rate(&self) -> f64 {
        if self.total_score > 0.0 {
            self.achieved_score / self.total_score
        } else {
            0.0
        }
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.end_time - self.start_time).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_rate_zero_total() {
        let result = ScoringResult::started("Empty");
        assert_eq!(result.score_rate(), 0.0);
    }

    #[test]
    fn test_score_rate_division() {
        let mut result = ScoringResult::started("Windows");
        result.total_score = 10.0;
        result.achieved_score = 5.0;
        assert_eq!(result.score_rate(), 0.5);
    }

    #[test]
    fn test_failed_result_carries_message_and_zero_score() {
        let result = KnowledgePointResult::failed("DeleteOperation", "base path unreachable");
        assert!(!result.is_correct);
        assert_eq!(result.achieved_score, 0.0);
        assert_eq!(result.knowledge_point_type, "DeleteOperation");
        assert_eq!(result.error_message.as_deref(), Some("base path unreachable"));
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut result = ScoringResult::started("Windows");
        result.total_score = 10.0;
        result.achieved_score = 10.0;
        result.is_success = true;
        let json = serde_json::to_string(&result).unwrap();
        let back: ScoringResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.subject, "Windows");
        assert_eq!(back.total_score, 10.0);
        assert!(back.is_success);
    }
}
