//! File-system operation detector family.
//!
//! Every check is a read-only inspection of the submission tree: existence,
//! attribute comparison, or content probe. Environment problems (unreachable
//! base path, unreadable archive) are folded into the result's error message;
//! a check that legitimately does not pass simply reports `is_correct =
//! false` with diagnostic details.

use crate::detectors::{
    ArtifactHandle, KnowledgePointDetector, OperationKind, SystemInspector, not_supported_result,
};
use crate::params::{self, ParameterSet};
use crate::types::KnowledgePointResult;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use util::exam_model::ModuleType;
use util::grading_config::GradingConfig;
use util::paths;

pub struct WindowsDetector {
    config: GradingConfig,
    system: Arc<dyn SystemInspector>,
}

impl WindowsDetector {
    pub fn new(config: GradingConfig, system: Arc<dyn SystemInspector>) -> Self {
        WindowsDetector { config, system }
    }

    fn resolve(&self, artifact: &ArtifactHandle, raw: &str) -> PathBuf {
        let drive = self.config.drive_prefix();
        let base = if artifact.base_path.as_os_str().is_empty() {
            None
        } else {
            Some(artifact.base_path.as_path())
        };
        paths::resolve_target(base, raw, &drive)
    }

    fn base_result(operation_type: &str, params: &ParameterSet) -> KnowledgePointResult {
        KnowledgePointResult {
            knowledge_point_type: operation_type.to_string(),
            parameters: params.to_map(),
            ..Default::default()
        }
    }

    fn detect_create(&self, params: &ParameterSet, artifact: &ArtifactHandle) -> KnowledgePointResult {
        let mut result = Self::base_result("CreateOperation", params);

        let file_type = params.get_or("FileType", "文件");
        if !params::is_valid_file_type(&file_type) {
            result.error_message = Some(format!(
                "invalid file type: {file_type} (expected 文件/文件夹, File/Folder)"
            ));
            return result;
        }

        // Two parameter shapes: ItemName (+ optional CreatePath), or a bare
        // TargetPath from older exports.
        let target = match (params.get("ItemName"), params.get("CreatePath")) {
            (Some(item), Some(create_path)) => format!("{create_path}\\{item}"),
            (Some(item), None) => item.to_string(),
            (None, _) => match params.get("TargetPath") {
                Some(target) => target.to_string(),
                None => {
                    result.error_message =
                        Some("missing required parameter: ItemName or TargetPath".to_string());
                    return result;
                }
            },
        };

        let full_path = self.resolve(artifact, &target);
        let exists = if params::is_folder_type(&file_type) {
            full_path.is_dir()
        } else {
            full_path.is_file()
        };

        result.is_correct = exists;
        result.details = if exists {
            format!("created: {}", full_path.display())
        } else {
            format!("not found: {}", full_path.display())
        };

        // Optional content probe for created files.
        if exists && full_path.is_file() {
            if let Some(expected) = params.get("ExpectedContent") {
                match fs::read_to_string(&full_path) {
                    Ok(actual) => {
                        let matches = actual.trim().eq_ignore_ascii_case(expected.trim());
                        result.is_correct = matches;
                        result.expected_value = Some(expected.to_string());
                        result.actual_value = Some(actual.trim().to_string());
                        result.details.push_str(if matches {
                            " (content matches)"
                        } else {
                            " (content differs)"
                        });
                    }
                    Err(e) => {
                        result.is_correct = false;
                        result.details.push_str(&format!(" (content unreadable: {e})"));
                    }
                }
            }
        }
        result
    }

    fn detect_delete(&self, params: &ParameterSet, artifact: &ArtifactHandle) -> KnowledgePointResult {
        let mut result = Self::base_result("DeleteOperation", params);

        let target = match params.require("TargetPath") {
            Ok(target) => target,
            Err(message) => {
                result.error_message = Some(message);
                return result;
            }
        };

        let full_path = self.resolve(artifact, target);
        let deleted = !full_path.exists();
        result.is_correct = deleted;
        result.details = if deleted {
            format!("target removed: {}", full_path.display())
        } else {
            format!("target still present: {}", full_path.display())
        };
        result
    }

    fn detect_copy(&self, params: &ParameterSet, artifact: &ArtifactHandle) -> KnowledgePointResult {
        let mut result = Self::base_result("CopyOperation", params);

        let (source, target) = match (params.require("SourcePath"), params.require("TargetPath")) {
            (Ok(source), Ok(target)) => (source, target),
            (Err(message), _) | (_, Err(message)) => {
                result.error_message = Some(message);
                return result;
            }
        };

        let source_path = self.resolve(artifact, source);
        let target_path = self.resolve(artifact, target);

        if !source_path.exists() {
            result.details = format!("source missing: {}", source_path.display());
            return result;
        }

        result.is_correct = target_path.exists();
        result.details = if result.is_correct {
            format!("copied: {} -> {}", source_path.display(), target_path.display())
        } else {
            format!("target missing: {}", target_path.display())
        };

        if result.is_correct {
            compare_file_sizes(&source_path, &target_path, &mut result);
        }
        result
    }

    fn detect_move(&self, params: &ParameterSet, artifact: &ArtifactHandle) -> KnowledgePointResult {
        let mut result = Self::base_result("MoveOperation", params);

        let (source, target) = match (params.require("SourcePath"), params.require("TargetPath")) {
            (Ok(source), Ok(target)) => (source, target),
            (Err(message), _) | (_, Err(message)) => {
                result.error_message = Some(message);
                return result;
            }
        };

        let source_path = self.resolve(artifact, source);
        let target_path = self.resolve(artifact, target);
        let source_exists = source_path.exists();
        let target_exists = target_path.exists();

        // A completed move leaves the source gone and the target present.
        result.is_correct = !source_exists && target_exists;
        result.details = match (source_exists, target_exists) {
            (false, true) => format!(
                "moved: {} -> {}",
                source_path.display(),
                target_path.display()
            ),
            (true, true) => "source and target both present; looks like a copy, not a move"
                .to_string(),
            (true, false) => "move incomplete: source still present, target missing".to_string(),
            (false, false) => format!(
                "neither source nor target present: {}, {}",
                source_path.display(),
                target_path.display()
            ),
        };
        result
    }

    fn detect_rename(&self, params: &ParameterSet, artifact: &ArtifactHandle) -> KnowledgePointResult {
        let mut result = Self::base_result("RenameOperation", params);

        let (original, renamed) = match (params.require("OriginalName"), params.require("NewName"))
        {
            (Ok(original), Ok(renamed)) => (original, renamed),
            (Err(message), _) | (_, Err(message)) => {
                result.error_message = Some(message);
                return result;
            }
        };

        let file_type = params.get_or("FileType", "文件");
        let original_path = self.resolve(artifact, original);
        let renamed_path = self.resolve(artifact, renamed);

        let (original_exists, renamed_exists) = if params::is_folder_type(&file_type) {
            (original_path.is_dir(), renamed_path.is_dir())
        } else {
            (original_path.is_file(), renamed_path.is_file())
        };

        result.is_correct = !original_exists && renamed_exists;
        result.details = match (original_exists, renamed_exists) {
            (false, true) => format!("renamed: {original} -> {renamed} ({file_type})"),
            (true, true) => "old and new names both present; looks like a copy, not a rename"
                .to_string(),
            (true, false) => "rename incomplete: old name still present, new name missing"
                .to_string(),
            (false, false) => format!("neither name present: {original}, {renamed}"),
        };
        result
    }

    fn detect_copy_rename(
        &self,
        params: &ParameterSet,
        artifact: &ArtifactHandle,
    ) -> KnowledgePointResult {
        let mut result = Self::base_result("CopyRenameOperation", params);

        let (source, target) = match (params.require("SourcePath"), params.require("TargetPath")) {
            (Ok(source), Ok(target)) => (source, target),
            (Err(message), _) | (_, Err(message)) => {
                result.error_message = Some(message);
                return result;
            }
        };

        let source_path = self.resolve(artifact, source);
        // The destination may be a directory with the renamed copy inside it.
        let target_path = match params.get("NewName") {
            Some(new_name) => self.resolve(artifact, target).join(new_name),
            None => self.resolve(artifact, target),
        };

        if !source_path.exists() {
            result.details = format!("source missing: {}", source_path.display());
            return result;
        }

        let target_exists = target_path.exists();
        let same_name = match (source_path.file_name(), target_path.file_name()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        };

        result.is_correct = target_exists && !same_name;
        result.details = if result.is_correct {
            format!(
                "copied and renamed: {} -> {}",
                source_path.display(),
                target_path.display()
            )
        } else if !target_exists {
            format!("target missing: {}", target_path.display())
        } else {
            "source and target share a name; looks like a plain copy".to_string()
        };

        if result.is_correct {
            compare_file_sizes(&source_path, &target_path, &mut result);
        }
        result
    }

    fn detect_shortcut(&self, params: &ParameterSet, artifact: &ArtifactHandle) -> KnowledgePointResult {
        let mut result = Self::base_result("ShortcutOperation", params);

        let shortcut = match params.require("ShortcutPath") {
            Ok(shortcut) => shortcut,
            Err(message) => {
                result.error_message = Some(message);
                return result;
            }
        };

        let mut shortcut_path = self.resolve(artifact, shortcut);
        let has_lnk = shortcut_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("lnk"));
        if !has_lnk {
            let with_ext = format!(
                "{}.lnk",
                shortcut_path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
            );
            shortcut_path.set_file_name(with_ext);
        }

        result.is_correct = shortcut_path.is_file();
        result.details = if result.is_correct {
            format!("shortcut present: {}", shortcut_path.display())
        } else {
            format!("shortcut missing: {}", shortcut_path.display())
        };
        result
    }

    fn detect_property_modification(
        &self,
        params: &ParameterSet,
        artifact: &ArtifactHandle,
    ) -> KnowledgePointResult {
        let mut result = Self::base_result("FilePropertyModification", params);

        let target = match params.require("TargetPath") {
            Ok(target) => target,
            Err(message) => {
                result.error_message = Some(message);
                return result;
            }
        };

        let full_path = self.resolve(artifact, target);
        if !full_path.exists() {
            result.error_message = Some(format!("target path missing: {}", full_path.display()));
            return result;
        }

        let property_type = params.get_or("PropertyType", "只读");
        if !params::is_valid_property_type(&property_type) {
            result.error_message = Some(format!(
                "invalid property type: {property_type} (expected 只读/隐藏/系统/存档)"
            ));
            return result;
        }

        let expected = params.get_bool("PropertyValue", params.get_bool("ReadOnly", false));

        // Only the read-only flag is observable through portable metadata;
        // the remaining attribute kinds need platform capabilities that are
        // not present here.
        if matches!(property_type.as_str(), "只读" | "ReadOnly" | "readonly") {
            match fs::metadata(&full_path) {
                Ok(metadata) => {
                    let actual = metadata.permissions().readonly();
                    result.is_correct = actual == expected;
                    result.expected_value = Some(expected.to_string());
                    result.actual_value = Some(actual.to_string());
                    result.details =
                        format!("read-only attribute: expected {expected}, actual {actual}");
                }
                Err(e) => {
                    result.error_message = Some(format!("could not read attributes: {e}"));
                }
            }
        } else {
            result.error_message = Some(format!(
                "attribute inspection for '{property_type}' is not available in this environment"
            ));
        }
        result
    }

    fn detect_registry(&self, params: &ParameterSet) -> KnowledgePointResult {
        let mut result = Self::base_result("RegistryOperation", params);

        let key = match params.require("KeyPath") {
            Ok(key) => key,
            Err(message) => {
                result.error_message = Some(message);
                return result;
            }
        };
        let expected = params.get_or("ExpectedValue", "");

        match self.system.registry_value_matches(key, &expected) {
            Ok(matches) => {
                result.is_correct = matches;
                result.details = format!("registry key {key}: match = {matches}");
            }
            Err(message) => result.error_message = Some(message),
        }
        result
    }

    fn detect_service(&self, params: &ParameterSet) -> KnowledgePointResult {
        let mut result = Self::base_result("ServiceCheck", params);

        let service = match params.require("ServiceName") {
            Ok(service) => service,
            Err(message) => {
                result.error_message = Some(message);
                return result;
            }
        };
        let expect_running = params.get_bool("ExpectedRunning", true);

        match self.system.service_running(service) {
            Ok(running) => {
                result.is_correct = running == expect_running;
                result.details =
                    format!("service {service}: expected running={expect_running}, actual={running}");
            }
            Err(message) => result.error_message = Some(message),
        }
        result
    }

    fn detect_process(&self, params: &ParameterSet) -> KnowledgePointResult {
        let mut result = Self::base_result("ProcessCheck", params);

        let process = match params.require("ProcessName") {
            Ok(process) => process,
            Err(message) => {
                result.error_message = Some(message);
                return result;
            }
        };
        let expect_running = params.get_bool("ExpectedRunning", true);

        match self.system.process_running(process) {
            Ok(running) => {
                result.is_correct = running == expect_running;
                result.details =
                    format!("process {process}: expected running={expect_running}, actual={running}");
            }
            Err(message) => result.error_message = Some(message),
        }
        result
    }

    async fn detect_network(&self, params: &ParameterSet) -> KnowledgePointResult {
        let mut result = Self::base_result("NetworkProbe", params);

        let host = match params.require("Host") {
            Ok(host) => host,
            Err(message) => {
                result.error_message = Some(message);
                return result;
            }
        };
        let port = params.get_i64("Port", 80);
        let deadline = Duration::from_secs(self.config.limits.network_timeout_secs);
        let address = format!("{host}:{port}");

        // A probe that times out resolves to a failed check, never a hang.
        match timeout(deadline, TcpStream::connect(&address)).await {
            Ok(Ok(_)) => {
                result.is_correct = true;
                result.details = format!("{address} reachable");
            }
            Ok(Err(e)) => {
                result.details = format!("{address} unreachable: {e}");
            }
            Err(_) => {
                result.details = format!(
                    "{address} unreachable: timed out after {}s",
                    deadline.as_secs()
                );
            }
        }
        result
    }

    fn detect_archive(&self, params: &ParameterSet, artifact: &ArtifactHandle) -> KnowledgePointResult {
        let mut result = Self::base_result("ArchiveOperation", params);

        let (archive, entry) = match (params.require("ArchivePath"), params.require("EntryName")) {
            (Ok(archive), Ok(entry)) => (archive, entry),
            (Err(message), _) | (_, Err(message)) => {
                result.error_message = Some(message);
                return result;
            }
        };

        let archive_path = self.resolve(artifact, archive);
        if !archive_path.is_file() {
            result.details = format!("archive missing: {}", archive_path.display());
            return result;
        }

        let file = match fs::File::open(&archive_path) {
            Ok(file) => file,
            Err(e) => {
                result.error_message = Some(format!("could not open archive: {e}"));
                return result;
            }
        };
        let mut zip = match zip::ZipArchive::new(file) {
            Ok(zip) => zip,
            Err(e) => {
                result.error_message = Some(format!("could not read archive: {e}"));
                return result;
            }
        };

        let mut found = false;
        for i in 0..zip.len() {
            if let Ok(entry_file) = zip.by_index(i) {
                let name = entry_file.name();
                if name.eq_ignore_ascii_case(entry)
                    || name.to_lowercase().ends_with(&format!("/{}", entry.to_lowercase()))
                {
                    found = true;
                    break;
                }
            }
        }

        result.is_correct = found;
        result.details = if found {
            format!("archive entry present: {entry}")
        } else {
            format!("archive entry missing: {entry}")
        };
        result
    }
}

fn compare_file_sizes(source: &Path, target: &Path, result: &mut KnowledgePointResult) {
    if !source.is_file() || !target.is_file() {
        return;
    }
    match (fs::metadata(source), fs::metadata(target)) {
        (Ok(source_meta), Ok(target_meta)) => {
            if source_meta.len() == target_meta.len() {
                result.details.push_str(" (sizes match)");
            } else {
                result.details.push_str(" (sizes differ)");
                result.is_correct = false;
            }
        }
        _ => result.details.push_str(" (sizes not comparable)"),
    }
}

#[async_trait]
impl KnowledgePointDetector for WindowsDetector {
    fn module_type(&self) -> ModuleType {
        ModuleType::Windows
    }

    async fn detect_one(
        &self,
        operation_type: &str,
        params: &ParameterSet,
        artifact: &ArtifactHandle,
    ) -> KnowledgePointResult {
        if !artifact.base_path.as_os_str().is_empty() && !artifact.base_path.is_dir() {
            let mut result = KnowledgePointResult::failed(
                operation_type,
                format!("base path unreachable: {}", artifact.base_path.display()),
            );
            result.parameters = params.to_map();
            return result;
        }

        let mut result = match OperationKind::from_tag(operation_type) {
            Some(OperationKind::Create) => self.detect_create(params, artifact),
            Some(OperationKind::Delete) => self.detect_delete(params, artifact),
            Some(OperationKind::Copy) => self.detect_copy(params, artifact),
            Some(OperationKind::Move) => self.detect_move(params, artifact),
            Some(OperationKind::Rename) => self.detect_rename(params, artifact),
            Some(OperationKind::CopyRename) => self.detect_copy_rename(params, artifact),
            Some(OperationKind::Shortcut) => self.detect_shortcut(params, artifact),
            Some(OperationKind::PropertyModification) => {
                self.detect_property_modification(params, artifact)
            }
            Some(OperationKind::RegistryCheck) => self.detect_registry(params),
            Some(OperationKind::ServiceCheck) => self.detect_service(params),
            Some(OperationKind::ProcessCheck) => self.detect_process(params),
            Some(OperationKind::NetworkProbe) => self.detect_network(params).await,
            Some(OperationKind::ArchiveContent) => self.detect_archive(params, artifact),
            None => not_supported_result(operation_type, params),
        };

        // Report under the tag that was actually dispatched on.
        result.knowledge_point_type = operation_type.to_string();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::LocalSystemInspector;
    use std::io::Write;
    use tempfile::TempDir;

    fn detector() -> WindowsDetector {
        WindowsDetector::new(GradingConfig::default_config(), Arc::new(LocalSystemInspector))
    }

    fn artifact(dir: &TempDir) -> ArtifactHandle {
        ArtifactHandle::for_base(dir.path())
    }

    fn write_file(dir: &TempDir, name: &str, content: &str) {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = fs::File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn test_delete_detected_when_target_absent() {
        let dir = TempDir::new().unwrap();
        let params = ParameterSet::from_pairs([("TargetPath", "gone.txt")]);
        let result = detector()
            .detect_one("DeleteOperation", &params, &artifact(&dir))
            .await;
        assert!(result.is_correct);
        assert!(result.error_message.is_none());
    }

    #[tokio::test]
    async fn test_delete_fails_when_target_present() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "keep.txt", "still here");
        let params = ParameterSet::from_pairs([("TargetPath", "keep.txt")]);
        let result = detector()
            .detect_one("DeleteOperation", &params, &artifact(&dir))
            .await;
        assert!(!result.is_correct);
        assert!(result.details.contains("still present"));
    }

    #[tokio::test]
    async fn test_alias_and_canonical_keys_detect_identically() {
        let dir = TempDir::new().unwrap();
        let canonical = ParameterSet::from_pairs([("TargetPath", "gone.txt")]);
        let alias = ParameterSet::from_pairs([("FilePath", "gone.txt")]);
        let d = detector();
        let a = d.detect_one("DeleteOperation", &canonical, &artifact(&dir)).await;
        let b = d.detect_one("DeleteOperation", &alias, &artifact(&dir)).await;
        assert_eq!(a.is_correct, b.is_correct);
        assert_eq!(a.details, b.details);
    }

    #[tokio::test]
    async fn test_create_file_and_folder() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "report.txt", "done");
        fs::create_dir_all(dir.path().join("backup")).unwrap();
        let d = detector();

        let file_params = ParameterSet::from_pairs([("ItemName", "report.txt")]);
        assert!(d.detect_one("CreateOperation", &file_params, &artifact(&dir)).await.is_correct);

        let folder_params =
            ParameterSet::from_pairs([("ItemName", "backup"), ("FileType", "文件夹")]);
        assert!(d.detect_one("CreateOperation", &folder_params, &artifact(&dir)).await.is_correct);

        let missing = ParameterSet::from_pairs([("ItemName", "nope.txt")]);
        assert!(!d.detect_one("CreateOperation", &missing, &artifact(&dir)).await.is_correct);
    }

    #[tokio::test]
    async fn test_create_with_expected_content() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "note.txt", "Hello World");
        let d = detector();

        let matching = ParameterSet::from_pairs([
            ("ItemName", "note.txt"),
            ("ExpectedContent", "hello world"),
        ]);
        assert!(d.detect_one("CreateOperation", &matching, &artifact(&dir)).await.is_correct);

        let differing = ParameterSet::from_pairs([
            ("ItemName", "note.txt"),
            ("ExpectedContent", "goodbye"),
        ]);
        assert!(!d.detect_one("CreateOperation", &differing, &artifact(&dir)).await.is_correct);
    }

    #[tokio::test]
    async fn test_copy_requires_both_paths_and_size_match() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "src.txt", "payload");
        write_file(&dir, "dst.txt", "payload");
        let d = detector();

        let ok = ParameterSet::from_pairs([("SourcePath", "src.txt"), ("TargetPath", "dst.txt")]);
        let result = d.detect_one("CopyOperation", &ok, &artifact(&dir)).await;
        assert!(result.is_correct);
        assert!(result.details.contains("sizes match"));

        write_file(&dir, "short.txt", "p");
        let mismatched =
            ParameterSet::from_pairs([("SourcePath", "src.txt"), ("TargetPath", "short.txt")]);
        let result = d.detect_one("CopyOperation", &mismatched, &artifact(&dir)).await;
        assert!(!result.is_correct);

        let missing_param = ParameterSet::from_pairs([("SourcePath", "src.txt")]);
        let result = d.detect_one("CopyOperation", &missing_param, &artifact(&dir)).await;
        assert!(result.error_message.unwrap().contains("TargetPath"));
    }

    #[tokio::test]
    async fn test_move_source_gone_target_present() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "moved.txt", "x");
        let d = detector();

        let done = ParameterSet::from_pairs([("SourcePath", "old.txt"), ("TargetPath", "moved.txt")]);
        assert!(d.detect_one("MoveOperation", &done, &artifact(&dir)).await.is_correct);

        write_file(&dir, "old.txt", "x");
        let copy_not_move =
            ParameterSet::from_pairs([("SourcePath", "old.txt"), ("TargetPath", "moved.txt")]);
        let result = d.detect_one("MoveOperation", &copy_not_move, &artifact(&dir)).await;
        assert!(!result.is_correct);
        assert!(result.details.contains("copy"));
    }

    #[tokio::test]
    async fn test_rename_by_file_type() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "new_name.txt", "x");
        let d = detector();
        let params = ParameterSet::from_pairs([
            ("OriginalFileName", "old_name.txt"),
            ("NewFileName", "new_name.txt"),
        ]);
        // Legacy alias keys resolve to OriginalName/NewName.
        assert!(d.detect_one("RenameOperation", &params, &artifact(&dir)).await.is_correct);
    }

    #[tokio::test]
    async fn test_copy_rename_with_destination_directory() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "chcp.com", "binary");
        write_file(&dir, "2/chcp2.com", "binary");
        let d = detector();
        let params = ParameterSet::from_pairs([
            ("SourcePath", "chcp.com"),
            ("DestinationPath", "2"),
            ("NewName", "chcp2.com"),
        ]);
        let result = d.detect_one("CopyAndRename", &params, &artifact(&dir)).await;
        assert!(result.is_correct, "details: {}", result.details);
    }

    #[tokio::test]
    async fn test_shortcut_appends_lnk_extension() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "calc.lnk", "link");
        let d = detector();
        let params = ParameterSet::from_pairs([("ShortcutPath", "calc")]);
        assert!(d.detect_one("ShortcutOperation", &params, &artifact(&dir)).await.is_correct);
    }

    #[tokio::test]
    async fn test_property_modification_readonly() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "locked.txt", "x");
        let path = dir.path().join("locked.txt");
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).unwrap();

        let d = detector();
        let params = ParameterSet::from_pairs([
            ("FilePath", "locked.txt"),
            ("PropertyType", "只读"),
            ("PropertyValue", "true"),
        ]);
        let result = d
            .detect_one("FilePropertyModification", &params, &artifact(&dir))
            .await;
        assert!(result.is_correct, "details: {}", result.details);

        // Restore so the tempdir can be cleaned up.
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        fs::set_permissions(&path, permissions).unwrap();
    }

    #[tokio::test]
    async fn test_unknown_operation_is_not_supported_not_a_panic() {
        let dir = TempDir::new().unwrap();
        let result = detector()
            .detect_one("FormatDisk", &ParameterSet::default(), &artifact(&dir))
            .await;
        assert!(!result.is_correct);
        assert!(result.error_message.unwrap().contains("unsupported operation type"));
    }

    #[tokio::test]
    async fn test_network_probe_times_out_to_failure() {
        let dir = TempDir::new().unwrap();
        let mut config = GradingConfig::default_config();
        config.limits.network_timeout_secs = 1;
        let d = WindowsDetector::new(config, Arc::new(LocalSystemInspector));
        // Reserved TEST-NET-1 address: never reachable.
        let params = ParameterSet::from_pairs([("Host", "192.0.2.1"), ("Port", "81")]);
        let result = d.detect_one("PingHost", &params, &artifact(&dir)).await;
        assert!(!result.is_correct);
        assert!(result.details.contains("unreachable"));
    }

    #[tokio::test]
    async fn test_archive_entry_probe() {
        use zip::write::FileOptions;

        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("backup.zip");
        let file = fs::File::create(&zip_path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options: FileOptions<'_, ()> = FileOptions::default();
        zip.start_file("docs/readme.txt", options).unwrap();
        zip.write_all(b"hello").unwrap();
        zip.finish().unwrap();

        let d = detector();
        let present = ParameterSet::from_pairs([
            ("ArchivePath", "backup.zip"),
            ("EntryName", "readme.txt"),
        ]);
        assert!(d.detect_one("ArchiveOperation", &present, &artifact(&dir)).await.is_correct);

        let absent = ParameterSet::from_pairs([
            ("ArchivePath", "backup.zip"),
            ("EntryName", "missing.txt"),
        ]);
        assert!(!d.detect_one("ArchiveOperation", &absent, &artifact(&dir)).await.is_correct);
    }

    #[tokio::test]
    async fn test_registry_check_reports_unavailable_capability() {
        let dir = TempDir::new().unwrap();
        let params = ParameterSet::from_pairs([("KeyPath", "HKCU\\Software\\Test")]);
        let result = detector()
            .detect_one("RegistryOperation", &params, &artifact(&dir))
            .await;
        assert!(!result.is_correct);
        assert!(result.error_message.unwrap().contains("not available"));
    }

    #[tokio::test]
    async fn test_unreachable_base_path_is_an_error_result() {
        let params = ParameterSet::from_pairs([("TargetPath", "x.txt")]);
        let handle = ArtifactHandle::for_base("/nonexistent/submission");
        let result = detector()
            .detect_one("DeleteOperation", &params, &handle)
            .await;
        assert!(!result.is_correct);
        assert!(result.error_message.unwrap().contains("base path unreachable"));
    }
}
