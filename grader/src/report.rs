//! # Grade Report Module
//!
//! This module defines the data structures and response envelope for returning grading results
//! from the grader system: one [`GradeReport`] with per-module and combined scoring results, and
//! a [`GradeReportResponse`] that wraps it with top-level `success` and `message` fields so API
//! callers always receive the same shape.
//!
//! ## Design Notes
//!
//! - [`GradeReport`] is intended for caller-facing output. It contains only serializable fields
//!   and is not used for internal grading logic.
//! - The [`From<GradeReport> for GradeReportResponse`] implementation provides ergonomic
//!   conversion at the grading entry point.

use crate::types::ScoringResult;
use serde::Serialize;

/// The final report generated after grading a submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    /// Id of the exam that was graded.
    pub exam_id: String,
    /// Display name of the exam.
    pub exam_name: String,
    /// When the report was produced (RFC 3339).
    pub created_at: String,
    /// One result per graded module, in exam order.
    pub module_results: Vec<ScoringResult>,
    /// The whole-submission rollup.
    pub combined: ScoringResult,
}

/// The response envelope for grading results.
#[derive(Debug, Serialize)]
pub struct GradeReportResponse {
    /// Indicates the grading run completed.
    pub success: bool,
    /// A human-readable message for the client.
    pub message: String,
    /// The detailed grading report.
    pub data: GradeReport,
}

impl From<GradeReport> for GradeReportResponse {
    fn from(report: GradeReport) -> Self {
        GradeReportResponse {
            success: true,
            message: "Grading complete.".to_string(),
            data: report,
        }
    }
}
