//! Exam ingestion pipeline.

use crate::ingest::encoding::EncodingReader;
use crate::ingest::sniffer::{self, ExamFileFormat};
use crate::parsers::exam_parser;
use crate::resolver;
use crate::validator;
use std::path::Path;
use util::exam_model::ExamModel;
use util::grading_config::GradingConfig;

/// Structured outcome of loading one exam-definition file. Fatal conditions
/// are reported here as a failed result with a message, never as a panic or
/// a bare error.
#[derive(Debug)]
pub struct LoadResult {
    pub is_success: bool,
    pub exam_model: Option<ExamModel>,
    pub error_message: String,
    pub detected_format: ExamFileFormat,
    pub id_conflicts_fixed: usize,
    pub validation_summary: String,
}

impl LoadResult {
    fn failure(format: ExamFileFormat, message: impl Into<String>) -> Self {
        LoadResult {
            is_success: false,
            exam_model: None,
            error_message: message.into(),
            detected_format: format,
            id_conflicts_fixed: 0,
            validation_summary: String::new(),
        }
    }
}

/// Load, repair, and validate an exam model from a file.
///
/// The pipeline: sniff the format, read with encoding fallback, parse into
/// the canonical tree, repair identifier conflicts, verify id uniqueness,
/// then check structural invariants.
pub fn load(path: &Path, config: &GradingConfig) -> LoadResult {
    let detected_format = sniffer::detect_format(path);
    tracing::info!(?path, format = detected_format.as_str(), "loading exam file");

    if detected_format == ExamFileFormat::Unknown {
        return LoadResult::failure(
            detected_format,
            format!(
                "unsupported or unrecognizable exam file: {} (expected .json or .xml)",
                path.display()
            ),
        );
    }

    let reader = EncodingReader::with_default_candidates(config.encoding_policy);
    let text = match reader.read_to_string(path) {
        Ok(text) => text,
        Err(e) => return LoadResult::failure(detected_format, e.message().to_string()),
    };

    let mut exam = match exam_parser::parse_exam_text(&text, detected_format) {
        Ok(exam) => exam,
        Err(e) => return LoadResult::failure(detected_format, e.message().to_string()),
    };

    let id_conflicts_fixed = resolver::resolve_conflicts(&mut exam);
    if id_conflicts_fixed > 0 {
        tracing::info!(count = id_conflicts_fixed, "repaired identifier conflicts");
    }

    let id_validation = resolver::validate_ids(&exam);
    if !id_validation.is_valid() {
        return LoadResult {
            is_success: false,
            exam_model: Some(exam),
            error_message: id_validation.summary(),
            detected_format,
            id_conflicts_fixed,
            validation_summary: id_validation.summary(),
        };
    }

    let (is_valid, validation_summary) = validator::validate(&exam);
    LoadResult {
        is_success: is_valid,
        error_message: if is_valid {
            String::new()
        } else {
            validation_summary.clone()
        },
        exam_model: Some(exam),
        detected_format,
        id_conflicts_fixed,
        validation_summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_exam(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    const VALID_EXAM: &str = r#"{
        "exam": {
            "id": "exam-1",
            "name": "Basics",
            "modules": [
                {
                    "id": "m-1",
                    "name": "Files",
                    "type": "Windows",
                    "questions": [
                        {"id": "q-1", "title": "Delete", "operationPoints": [
                            {"id": "op-1", "name": "DeleteOperation", "score": 5,
                             "parameters": [{"name": "TargetPath", "value": "x.txt"}]}
                        ]}
                    ]
                }
            ]
        },
        "metadata": {"exportVersion": "2.0"}
    }"#;

    #[test]
    fn test_load_valid_designer_export() {
        let dir = TempDir::new().unwrap();
        let path = write_exam(&dir, "exam.json", VALID_EXAM);
        let result = load(&path, &GradingConfig::default_config());
        assert!(result.is_success, "error: {}", result.error_message);
        assert_eq!(result.detected_format, ExamFileFormat::Json);
        assert_eq!(result.id_conflicts_fixed, 0);
        assert_eq!(result.exam_model.unwrap().modules.len(), 1);
    }

    #[test]
    fn test_load_repairs_duplicate_ids() {
        let dir = TempDir::new().unwrap();
        let duplicated = VALID_EXAM.replace("\"q-1\"", "\"m-1\"");
        let path = write_exam(&dir, "exam.json", &duplicated);
        let result = load(&path, &GradingConfig::default_config());
        assert!(result.is_success);
        assert_eq!(result.id_conflicts_fixed, 1);
        let validation = crate::resolver::validate_ids(&result.exam_model.unwrap());
        assert!(validation.is_valid());
    }

    #[test]
    fn test_load_unknown_extension_fails_with_message() {
        let dir = TempDir::new().unwrap();
        let path = write_exam(&dir, "exam.docx", "not an exam");
        let result = load(&path, &GradingConfig::default_config());
        assert!(!result.is_success);
        assert_eq!(result.detected_format, ExamFileFormat::Unknown);
        assert!(result.error_message.contains("unsupported"));
    }

    #[test]
    fn test_load_designer_xml_reports_not_supported() {
        let dir = TempDir::new().unwrap();
        let path = write_exam(&dir, "exam.xml", "<ExamExport version=\"2.0\"/>");
        let result = load(&path, &GradingConfig::default_config());
        assert!(!result.is_success);
        assert_eq!(result.detected_format, ExamFileFormat::DesignerProject);
        assert!(result.error_message.contains("Re-export the exam as JSON"));
    }

    #[test]
    fn test_load_invalid_exam_fails_validation() {
        let dir = TempDir::new().unwrap();
        let path = write_exam(
            &dir,
            "exam.json",
            r#"{"id": "exam-x", "name": "No modules", "modules": []}"#,
        );
        let result = load(&path, &GradingConfig::default_config());
        assert!(!result.is_success);
        assert!(result.error_message.contains("no modules"));
        // The parsed tree is still returned for diagnostics.
        assert!(result.exam_model.is_some());
    }

    #[test]
    fn test_load_bad_json_reports_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_exam(&dir, "exam.json", "{broken");
        let result = load(&path, &GradingConfig::default_config());
        assert!(!result.is_success);
        assert!(result.error_message.contains("JSON syntax error"));
    }
}
