//!
//! Detectors Module
//!
//! One detector family per module type evaluates operation points against the
//! student's submitted artifacts. Dispatch happens over a closed vocabulary
//! of operation-type tags ([`OperationKind`]); a tag outside the vocabulary
//! yields a not-supported result instead of an error so one unknown knowledge
//! point never aborts a run.
//!
//! - [`windows`]: file-system operation family plus archive, process,
//!   service, registry and network checks.
//! - [`office`]: PowerPoint/Word/Excel checks delegated to a document
//!   inspection capability.
//! - [`csharp`]: source-code submission checks, optionally backed by the AI
//!   scoring capability.
//! - [`ai`]: the AI qualitative scoring client.

pub mod ai;
pub mod csharp;
pub mod office;
pub mod windows;

use crate::params::ParameterSet;
use crate::types::KnowledgePointResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use util::exam_model::{CSharpQuestionType, ModuleType, OperationPoint, Question};
use util::grading_config::GradingConfig;
use util::paths;

/// Closed vocabulary of Windows operation kinds the detector can check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Delete,
    Copy,
    Move,
    Rename,
    CopyRename,
    Shortcut,
    PropertyModification,
    RegistryCheck,
    ServiceCheck,
    ProcessCheck,
    NetworkProbe,
    ArchiveContent,
}

impl OperationKind {
    /// Resolve an operation-type tag: canonical names, the authoring tool's
    /// legacy names, and localized display names all map onto one kind.
    /// `None` means the tag is outside the vocabulary and must surface as a
    /// not-supported result.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "QuickCreate" | "CreateOperation" | "CreateFile" | "CreateFolder"
            | "创建文件/文件夹" | "创建文件" | "创建文件夹" => Some(OperationKind::Create),
            "DeleteOperation" | "DeleteFile" | "DeleteFolder" | "删除文件/文件夹"
            | "删除文件" | "删除文件夹" => Some(OperationKind::Delete),
            "CopyOperation" | "CopyFile" | "CopyFolder" | "复制文件/文件夹" | "复制文件" => {
                Some(OperationKind::Copy)
            }
            "MoveOperation" | "MoveFile" | "MoveFolder" | "移动文件/文件夹" => {
                Some(OperationKind::Move)
            }
            "RenameOperation" | "RenameFile" | "RenameFolder" | "重命名文件/文件夹" => {
                Some(OperationKind::Rename)
            }
            "CopyRenameOperation" | "CopyAndRename" | "复制并重命名" => {
                Some(OperationKind::CopyRename)
            }
            "ShortcutOperation" | "CreateShortcut" | "创建快捷方式" => {
                Some(OperationKind::Shortcut)
            }
            "FilePropertyModification" | "SetFileAttributes" | "SetFilePermissions"
            | "ModifyProperties" | "修改文件属性" => Some(OperationKind::PropertyModification),
            "RegistryOperation" | "CreateRegistryKey" | "SetRegistryValue"
            | "DeleteRegistryKey" | "注册表操作" => Some(OperationKind::RegistryCheck),
            "ServiceCheck" | "StartService" | "StopService" | "服务操作" => {
                Some(OperationKind::ServiceCheck)
            }
            "ProcessCheck" | "StartProcess" | "KillProcess" | "进程操作" => {
                Some(OperationKind::ProcessCheck)
            }
            "NetworkProbe" | "PingHost" | "网络连通性" => Some(OperationKind::NetworkProbe),
            "ArchiveOperation" | "CreateZipArchive" | "ExtractZipArchive" | "压缩文件操作" => {
                Some(OperationKind::ArchiveContent)
            }
            _ => None,
        }
    }
}

/// Handle to the student's submission artifacts for one question.
///
/// The base path always points at the submission root; the optional fields
/// are populated from the question when the owning module needs them
/// (document path for Office modules, source path and program I/O for C#).
#[derive(Debug, Clone, Default)]
pub struct ArtifactHandle {
    pub base_path: PathBuf,
    pub document_path: Option<PathBuf>,
    pub source_path: Option<PathBuf>,
    pub program_input: Option<String>,
    pub expected_output: Option<String>,
    pub csharp_mode: Option<CSharpQuestionType>,
}

impl ArtifactHandle {
    pub fn for_base(base: impl Into<PathBuf>) -> Self {
        ArtifactHandle {
            base_path: base.into(),
            ..Default::default()
        }
    }

    /// Handle enriched with the question's file paths and C# context.
    pub fn for_question(base: &Path, question: &Question, config: &GradingConfig) -> Self {
        let drive = config.drive_prefix();
        let resolve =
            |raw: &str| paths::resolve_target(Some(base), raw, &drive);

        ArtifactHandle {
            base_path: base.to_path_buf(),
            document_path: question.document_file_path.as_deref().map(resolve),
            source_path: question.code_file_path.as_deref().map(resolve),
            program_input: question.program_input.clone(),
            expected_output: question.expected_output.clone(),
            csharp_mode: question.csharp_question_type,
        }
    }
}

/// A detector family: evaluates one operation point at a time against the
/// submission, returning exactly one result per point. Implementations are
/// read-only on the artifact and must fold environment failures into the
/// result's error message instead of returning errors.
#[async_trait]
pub trait KnowledgePointDetector: Send + Sync {
    /// The module family this detector serves.
    fn module_type(&self) -> ModuleType;

    /// Evaluate a single operation type with normalized parameters.
    async fn detect_one(
        &self,
        operation_type: &str,
        params: &ParameterSet,
        artifact: &ArtifactHandle,
    ) -> KnowledgePointResult;

    /// Evaluate a batch of operation points, isolating each point's outcome.
    async fn detect_batch(
        &self,
        operation_points: &[OperationPoint],
        artifact: &ArtifactHandle,
    ) -> Vec<KnowledgePointResult> {
        let mut results = Vec::with_capacity(operation_points.len());
        for operation in operation_points {
            let params = ParameterSet::from_operation_point(operation);
            let operation_type = operation.knowledge_type(self.module_type()).to_string();
            let mut result = self.detect_one(&operation_type, &params, artifact).await;
            finalize_result(&mut result, operation);
            results.push(result);
        }
        results
    }
}

/// Stamp an operation point's identity and configured score onto its result.
pub fn finalize_result(result: &mut KnowledgePointResult, operation: &OperationPoint) {
    result.operation_point_id = Some(operation.id.clone());
    result.knowledge_point_name = operation.name.clone();
    result.total_score = operation.score;
    result.achieved_score = match result.partial_credit {
        Some(rate) => operation.score * rate.clamp(0.0, 1.0),
        None if result.is_correct => operation.score,
        None => 0.0,
    };
}

/// Result used for tags outside the detector's vocabulary.
pub fn not_supported_result(operation_type: &str, params: &ParameterSet) -> KnowledgePointResult {
    let mut result = KnowledgePointResult::failed(
        operation_type,
        format!("unsupported operation type: {operation_type}"),
    );
    result.parameters = params.to_map();
    result
}

/// Capability interface for system-level inspection the core does not
/// implement itself (registry, services); the default implementation covers
/// the process table and reports the rest as explicitly unsupported.
pub trait SystemInspector: Send + Sync {
    /// Whether a process with the given executable name is running.
    fn process_running(&self, name: &str) -> Result<bool, String>;

    /// Whether a service with the given name is in the expected state.
    fn service_running(&self, name: &str) -> Result<bool, String> {
        Err(format!(
            "service inspection is not available in this environment (service: {name})"
        ))
    }

    /// Whether a registry value matches the expectation.
    fn registry_value_matches(&self, key: &str, _value: &str) -> Result<bool, String> {
        Err(format!(
            "registry inspection is not available in this environment (key: {key})"
        ))
    }
}

/// Default system inspector backed by the process table.
pub struct LocalSystemInspector;

impl SystemInspector for LocalSystemInspector {
    fn process_running(&self, name: &str) -> Result<bool, String> {
        use sysinfo::{ProcessesToUpdate, System};

        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::All, true);
        Ok(system
            .processes_by_name(std::ffi::OsStr::new(name))
            .next()
            .is_some())
    }
}

/// Build the detector for a module family.
pub fn detector_for(
    module_type: ModuleType,
    config: &GradingConfig,
    system: Arc<dyn SystemInspector>,
    documents: Arc<dyn office::DocumentInspector>,
    scoring: Arc<dyn ai::ScoringCapability>,
) -> Box<dyn KnowledgePointDetector> {
    match module_type {
        ModuleType::Windows => Box::new(windows::WindowsDetector::new(config.clone(), system)),
        ModuleType::PowerPoint | ModuleType::Word | ModuleType::Excel => {
            Box::new(office::OfficeDetector::new(module_type, documents))
        }
        ModuleType::CSharp => Box::new(csharp::CSharpDetector::new(config.clone(), scoring)),
    }
}
