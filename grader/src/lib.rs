//! # Grader Library
//!
//! This crate provides the core logic for automated grading of practical computer exams.
//! It supports loading exam definitions from multiple authoring-tool formats (with encoding
//! recovery and identifier repair), validating the resulting exam model, detecting which
//! instructor-defined knowledge points a student's submission satisfies, and rolling the
//! outcomes up into weighted scores.
//!
//! ## Key Concepts
//! - **GradingJob**: The main struct representing a grading run for a single submission.
//! - **Detectors**: One detector family per module type (file-system operations, Office
//!   documents, C# sources), each evaluating operation points against submitted artifacts.
//! - **Capabilities**: Pluggable seams for system inspection, document inspection, and AI
//!   qualitative scoring; concrete implementations live outside this core.
//! - **Reports**: Structured per-module and whole-submission scoring results.

pub mod detectors;
pub mod error;
pub mod ingest;
pub mod params;
pub mod parsers;
pub mod report;
pub mod resolver;
pub mod scorer;
pub mod types;
pub mod validator;

use crate::detectors::ai::{AiScoringClient, ScoringCapability};
use crate::detectors::office::{DocumentInspector, UnavailableDocumentInspector};
use crate::detectors::{LocalSystemInspector, SystemInspector, detector_for};
use crate::error::GraderError;
use crate::report::{GradeReport, GradeReportResponse};
use crate::types::ScoringResult;

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use util::exam_model::ExamModel;
use util::grading_config::GradingConfig;

/// Represents a grading run for a single student submission.
///
/// The job owns the validated exam model, the submission root, the per-run
/// grading configuration, and the capability implementations the detectors
/// call into. Capabilities default to the local environment (process table,
/// no document inspection, HTTP-backed AI scoring) and can be overridden for
/// other deployments or for tests.
pub struct GradingJob {
    exam: ExamModel,
    submission_root: PathBuf,
    config: GradingConfig,
    system: Arc<dyn SystemInspector>,
    documents: Arc<dyn DocumentInspector>,
    scoring: Arc<dyn ScoringCapability>,
}

impl GradingJob {
    /// Create a grading job with the default configuration and capabilities.
    pub fn new(exam: ExamModel, submission_root: impl Into<PathBuf>) -> Self {
        GradingJob {
            exam,
            submission_root: submission_root.into(),
            config: GradingConfig::default_config(),
            system: Arc::new(LocalSystemInspector),
            documents: Arc::new(UnavailableDocumentInspector),
            scoring: Arc::new(AiScoringClient::new()),
        }
    }

    /// Set the per-run grading configuration.
    pub fn with_config(mut self, config: GradingConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the system-inspection capability (registry/service/process).
    pub fn with_system_inspector(mut self, system: Arc<dyn SystemInspector>) -> Self {
        self.system = system;
        self
    }

    /// Replace the Office document inspection capability.
    pub fn with_document_inspector(mut self, documents: Arc<dyn DocumentInspector>) -> Self {
        self.documents = documents;
        self
    }

    /// Replace the AI qualitative scoring capability.
    pub fn with_scoring_capability(mut self, scoring: Arc<dyn ScoringCapability>) -> Self {
        self.scoring = scoring;
        self
    }

    /// Run the grading process and produce a report.
    ///
    /// # Steps
    /// 1. Validates the exam model's structural invariants.
    /// 2. For each enabled module, builds the matching detector family and
    ///    scores every enabled question/operation point (concurrently, with
    ///    per-point isolation).
    /// 3. Combines module results into a whole-submission result and wraps
    ///    everything in a response envelope.
    pub async fn grade(self) -> Result<GradeReportResponse, GraderError> {
        let (is_valid, message) = validator::validate(&self.exam);
        if !is_valid {
            return Err(GraderError::ValidationError(message));
        }

        // Per-run override first, then the explicit submission root, then the
        // configured global root.
        let base_path = self.config.paths.base_dir.clone().unwrap_or_else(|| {
            if self.submission_root.as_os_str().is_empty() {
                util::paths::submission_root()
            } else {
                self.submission_root.clone()
            }
        });

        let mut module_results: Vec<ScoringResult> = Vec::new();
        for module in self.exam.modules.iter().filter(|m| m.is_enabled) {
            let detector: Arc<dyn detectors::KnowledgePointDetector> = detector_for(
                module.module_type,
                &self.config,
                Arc::clone(&self.system),
                Arc::clone(&self.documents),
                Arc::clone(&self.scoring),
            )
            .into();

            let result = scorer::score_module(module, detector, &base_path, &self.config).await;
            module_results.push(result);
        }

        let combined = scorer::combine_results(&module_results, &self.exam.name);
        let report = GradeReport {
            exam_id: self.exam.id.clone(),
            exam_name: self.exam.name.clone(),
            created_at: Utc::now().to_rfc3339(),
            module_results,
            combined,
        };
        Ok(report.into())
    }
}
