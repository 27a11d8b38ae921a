//! Source-code submission detector.
//!
//! C# questions grade in one of three modes. Code completion is checked
//! textually: the submitted source must exist and carry no remaining
//! fill-in markers. Debugging and implementation grading are qualitative
//! and delegate to the AI scoring capability, whose fractional assessment
//! becomes partial credit when the run allows it.

use crate::detectors::ai::{AssessmentRequest, ScoringCapability};
use crate::detectors::{ArtifactHandle, KnowledgePointDetector};
use crate::params::ParameterSet;
use crate::types::KnowledgePointResult;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::sync::Arc;
use util::exam_model::{CSharpQuestionType, ModuleType};
use util::grading_config::GradingConfig;

/// Markers a completed code-completion submission must no longer contain.
static COMPLETION_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"NotImplementedException|//\s*TODO\b").expect("valid marker pattern"));

pub struct CSharpDetector {
    config: GradingConfig,
    scoring: Arc<dyn ScoringCapability>,
}

impl CSharpDetector {
    pub fn new(config: GradingConfig, scoring: Arc<dyn ScoringCapability>) -> Self {
        CSharpDetector { config, scoring }
    }

    fn detect_code_completion(source: &str, result: &mut KnowledgePointResult) {
        let remaining = COMPLETION_MARKERS.find_iter(source).count();
        result.is_correct = remaining == 0;
        result.details = if remaining == 0 {
            "all completion blanks filled".to_string()
        } else {
            format!("{remaining} completion marker(s) still present")
        };
    }

    async fn detect_with_assessment(
        &self,
        mode: CSharpQuestionType,
        source: String,
        params: &ParameterSet,
        artifact: &ArtifactHandle,
        result: &mut KnowledgePointResult,
    ) {
        let mode_tag = match mode {
            CSharpQuestionType::CodeCompletion => "code_completion",
            CSharpQuestionType::Debugging => "debugging",
            CSharpQuestionType::Implementation => "implementation",
        };

        let request = AssessmentRequest {
            mode: mode_tag.to_string(),
            source,
            requirement: params.get_or("Requirement", ""),
            program_input: artifact.program_input.clone(),
            expected_output: artifact.expected_output.clone(),
        };

        match self.scoring.assess_source(&request).await {
            Ok(assessment) => {
                result.is_correct = assessment.score_rate >= 0.999;
                result.details = assessment.reasoning;
                if self.config.detection.enable_partial_scoring {
                    result.partial_credit = Some(assessment.score_rate);
                }
            }
            Err(message) => result.error_message = Some(message),
        }
    }
}

#[async_trait]
impl KnowledgePointDetector for CSharpDetector {
    fn module_type(&self) -> ModuleType {
        ModuleType::CSharp
    }

    async fn detect_one(
        &self,
        operation_type: &str,
        params: &ParameterSet,
        artifact: &ArtifactHandle,
    ) -> KnowledgePointResult {
        let mut result = KnowledgePointResult {
            knowledge_point_type: operation_type.to_string(),
            parameters: params.to_map(),
            ..Default::default()
        };

        let source_path = match artifact.source_path.as_deref() {
            Some(path) => path.to_path_buf(),
            None => {
                result.error_message =
                    Some("no source file submitted for the C# module".to_string());
                return result;
            }
        };
        if !source_path.is_file() {
            result.error_message = Some(format!("source file missing: {}", source_path.display()));
            return result;
        }
        let source = match fs::read_to_string(&source_path) {
            Ok(source) => source,
            Err(e) => {
                result.error_message = Some(format!("source file unreadable: {e}"));
                return result;
            }
        };
        if source.trim().is_empty() {
            result.details = "submitted source file is empty".to_string();
            return result;
        }

        // The question's declared mode wins; the operation tag is a fallback
        // for standalone detect calls.
        let mode = artifact
            .csharp_mode
            .or_else(|| CSharpQuestionType::from_name(operation_type))
            .unwrap_or(CSharpQuestionType::CodeCompletion);

        match mode {
            CSharpQuestionType::CodeCompletion => Self::detect_code_completion(&source, &mut result),
            CSharpQuestionType::Debugging | CSharpQuestionType::Implementation => {
                self.detect_with_assessment(mode, source, params, artifact, &mut result)
                    .await;
            }
        }
        result
    }
}
