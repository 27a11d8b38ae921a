//! Office document detector family.
//!
//! Concrete document inspection (OOXML reading) lives outside this core. The
//! detector owns dispatch, parameter plumbing, and result shaping, and asks a
//! [`DocumentInspector`] capability whether the document satisfies one
//! knowledge point. The default inspector reports every probe as explicitly
//! unavailable, which keeps runs without a wired-up inspector diagnosable.

use crate::detectors::{ArtifactHandle, KnowledgePointDetector};
use crate::params::ParameterSet;
use crate::types::KnowledgePointResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use util::exam_model::ModuleType;

/// Outcome of one capability probe against a document.
#[derive(Debug, Clone)]
pub struct DocumentProbe {
    pub satisfied: bool,
    pub details: String,
    pub expected_value: Option<String>,
    pub actual_value: Option<String>,
}

/// Capability interface for inspecting an Office document.
pub trait DocumentInspector: Send + Sync {
    /// Evaluate one knowledge point against the document at `document`.
    ///
    /// `Err` means the probe itself could not run (missing document, probe
    /// not implemented); the message ends up on the result's error field.
    fn probe(
        &self,
        module_type: ModuleType,
        document: &Path,
        knowledge_type: &str,
        parameters: &HashMap<String, String>,
    ) -> Result<DocumentProbe, String>;
}

/// Default inspector: names the missing capability rather than guessing.
pub struct UnavailableDocumentInspector;

impl DocumentInspector for UnavailableDocumentInspector {
    fn probe(
        &self,
        module_type: ModuleType,
        _document: &Path,
        knowledge_type: &str,
        _parameters: &HashMap<String, String>,
    ) -> Result<DocumentProbe, String> {
        Err(format!(
            "{} document inspection is not available in this environment (knowledge point: {knowledge_type})",
            module_type.as_str()
        ))
    }
}

/// Detector for the PowerPoint, Word and Excel module families.
pub struct OfficeDetector {
    module_type: ModuleType,
    inspector: Arc<dyn DocumentInspector>,
}

impl OfficeDetector {
    pub fn new(module_type: ModuleType, inspector: Arc<dyn DocumentInspector>) -> Self {
        OfficeDetector {
            module_type,
            inspector,
        }
    }
}

#[async_trait]
impl KnowledgePointDetector for OfficeDetector {
    fn module_type(&self) -> ModuleType {
        self.module_type
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

        let document = match artifact.document_path.as_deref() {
            Some(document) => document,
            None => {
                result.error_message = Some(format!(
                    "no document submitted for the {} module",
                    self.module_type.as_str()
                ));
                return result;
            }
        };
        if !document.is_file() {
            result.error_message = Some(format!("document missing: {}", document.display()));
            return result;
        }

        match self
            .inspector
            .probe(self.module_type, document, operation_type, &result.parameters)
        {
            Ok(probe) => {
                result.is_correct = probe.satisfied;
                result.details = probe.details;
                result.expected_value = probe.expected_value;
                result.actual_value = probe.actual_value;
            }
            Err(message) => result.error_message = Some(message),
        }
        result
    }
}
