//! Identifier conflict resolution.
//!
//! Downstream consumers address entities by flat id lookup, so uniqueness is
//! enforced globally across the whole tree, not per sibling list. The tree is
//! flattened into a sequence of (entity kind, id slot) pairs by a pre-order
//! visitor; the seen-set and the rewrite rule never need to know the tree
//! shape. The first occurrence of an id always wins; later duplicates (and
//! blank ids) are rewritten deterministically in traversal order, which makes
//! the whole pass idempotent: a second run performs zero substitutions.

use std::collections::{HashMap, HashSet};
use util::exam_model::ExamModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Exam,
    Module,
    Question,
    OperationPoint,
    Parameter,
}

impl EntityKind {
    fn prefix(self) -> &'static str {
        match self {
            EntityKind::Exam => "exam",
            EntityKind::Module => "module",
            EntityKind::Question => "question",
            EntityKind::OperationPoint => "operation",
            EntityKind::Parameter => "parameter",
        }
    }

    fn name(self) -> &'static str {
        match self {
            EntityKind::Exam => "Exam",
            EntityKind::Module => "Module",
            EntityKind::Question => "Question",
            EntityKind::OperationPoint => "OperationPoint",
            EntityKind::Parameter => "Parameter",
        }
    }
}

/// Pre-order flattening of every id slot in the tree.
fn id_slots(exam: &mut ExamModel) -> Vec<(EntityKind, &mut String)> {
    let mut slots: Vec<(EntityKind, &mut String)> = Vec::new();
    slots.push((EntityKind::Exam, &mut exam.id));
    for module in &mut exam.modules {
        slots.push((EntityKind::Module, &mut module.id));
        for question in &mut module.questions {
            slots.push((EntityKind::Question, &mut question.id));
            for operation in &mut question.operation_points {
                slots.push((EntityKind::OperationPoint, &mut operation.id));
                for parameter in &mut operation.parameters {
                    slots.push((EntityKind::Parameter, &mut parameter.id));
                }
            }
        }
    }
    slots
}

/// Repair every blank or duplicate identifier in the tree, returning the
/// number of substitutions performed. Never fails.
pub fn resolve_conflicts(exam: &mut ExamModel) -> usize {
    let mut used: HashSet<String> = HashSet::new();
    let mut repaired = 0;

    for (kind, slot) in id_slots(exam) {
        let key = slot.trim().to_lowercase();
        if !key.is_empty() && used.insert(key) {
            continue;
        }

        let new_id = generate_unique_id(kind.prefix(), &used);
        if slot.trim().is_empty() {
            tracing::info!(kind = kind.name(), new = %new_id, "assigned id to blank identifier");
        } else {
            tracing::info!(kind = kind.name(), old = %slot, new = %new_id, "repaired duplicate identifier");
        }
        used.insert(new_id.to_lowercase());
        *slot = new_id;
        repaired += 1;
    }

    repaired
}

/// Deterministic replacement id: a per-prefix counter advanced past every id
/// already in use. Identical trees always produce identical replacements.
fn generate_unique_id(prefix: &str, used: &HashSet<String>) -> String {
    let mut counter: u32 = 1;
    loop {
        let candidate = format!("{prefix}-r{counter:04}");
        if !used.contains(&candidate.to_lowercase()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Outcome of a post-resolution uniqueness sweep.
#[derive(Debug, Default)]
pub struct IdValidation {
    /// Duplicate ids mapped to every location using them.
    pub duplicate_ids: HashMap<String, Vec<String>>,
    /// Locations carrying a blank id.
    pub empty_ids: Vec<String>,
}

impl IdValidation {
    pub fn is_valid(&self) -> bool {
        self.duplicate_ids.is_empty() && self.empty_ids.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.is_valid() {
            return "all identifiers are unique".to_string();
        }
        let mut issues = Vec::new();
        if !self.empty_ids.is_empty() {
            issues.push(format!("{} blank id(s)", self.empty_ids.len()));
        }
        if !self.duplicate_ids.is_empty() {
            issues.push(format!("{} duplicated id(s)", self.duplicate_ids.len()));
        }
        format!("identifier problems found: {}", issues.join(", "))
    }
}

/// Verify global id uniqueness without mutating anything.
pub fn validate_ids(exam: &ExamModel) -> IdValidation {
    let mut seen: HashMap<String, Vec<String>> = HashMap::new();

    let mut collect = |id: &str, location: String| {
        seen.entry(id.trim().to_lowercase()).or_default().push(location);
    };

    collect(&exam.id, "Exam".to_string());
    for module in &exam.modules {
        collect(&module.id, format!("Module[{}]", module.name));
        for question in &module.questions {
            collect(&question.id, format!("Question[{}]", question.title));
            for operation in &question.operation_points {
                collect(&operation.id, format!("Operation[{}]", operation.name));
                for parameter in &operation.parameters {
                    collect(&parameter.id, format!("Parameter[{}]", parameter.name));
                }
            }
        }
    }

    let mut validation = IdValidation::default();
    for (id, locations) in seen {
        if id.is_empty() {
            validation.empty_ids.extend(locations);
        } else if locations.len() > 1 {
            validation.duplicate_ids.insert(id, locations);
        }
    }
    validation
}

#[cfg(test)]
mod tests {
    use super::*;
    use util::exam_model::{ExamModule, ModuleType, OperationPoint, Question};

    fn exam_with_ids(module_ids: &[&str], question_ids: &[&str]) -> ExamModel {
        let questions: Vec<Question> = question_ids
            .iter()
            .map(|id| Question {
                id: id.to_string(),
                title: format!("Question {id}"),
                content: String::new(),
                score: 10.0,
                order: 0,
                is_enabled: true,
                csharp_question_type: None,
                program_input: None,
                expected_output: None,
                code_file_path: None,
                document_file_path: None,
                operation_points: vec![],
            })
            .collect();

        ExamModel {
            id: "exam-1".to_string(),
            name: "Exam".to_string(),
            description: String::new(),
            total_score: 100.0,
            duration_minutes: 120,
            is_enabled: true,
            tags: String::new(),
            created_at: None,
            updated_at: None,
            modules: module_ids
                .iter()
                .map(|id| ExamModule {
                    id: id.to_string(),
                    name: format!("Module {id}"),
                    description: String::new(),
                    module_type: ModuleType::Windows,
                    score: 0.0,
                    order: 0,
                    is_enabled: true,
                    questions: questions.clone(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_no_conflicts_means_no_repairs() {
        let mut exam = exam_with_ids(&["m-1", "m-2"], &[]);
        assert_eq!(resolve_conflicts(&mut exam), 0);
        assert!(validate_ids(&exam).is_valid());
    }

    #[test]
    fn test_later_duplicate_is_rewritten_first_kept() {
        let mut exam = exam_with_ids(&["m-1", "m-1"], &[]);
        assert_eq!(resolve_conflicts(&mut exam), 1);
        assert_eq!(exam.modules[0].id, "m-1");
        assert_ne!(exam.modules[1].id, "m-1");
        assert!(validate_ids(&exam).is_valid());
    }

    #[test]
    fn test_duplicates_across_entity_kinds_are_global() {
        // A question reusing a module id still counts as a conflict.
        let mut exam = exam_with_ids(&["shared"], &["shared"]);
        assert_eq!(resolve_conflicts(&mut exam), 1);
        assert!(validate_ids(&exam).is_valid());
    }

    #[test]
    fn test_case_insensitive_conflict() {
        let mut exam = exam_with_ids(&["ABC", "abc"], &[]);
        assert_eq!(resolve_conflicts(&mut exam), 1);
        assert!(validate_ids(&exam).is_valid());
    }

    #[test]
    fn test_blank_ids_are_assigned() {
        let mut exam = exam_with_ids(&["", "  "], &[]);
        assert_eq!(resolve_conflicts(&mut exam), 2);
        assert!(!exam.modules[0].id.trim().is_empty());
        assert!(!exam.modules[1].id.trim().is_empty());
        assert!(validate_ids(&exam).is_valid());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut exam = exam_with_ids(&["m-1", "m-1", ""], &["q", "q"]);
        let first = resolve_conflicts(&mut exam);
        assert!(first > 0);
        let snapshot = exam.clone();
        assert_eq!(resolve_conflicts(&mut exam), 0);
        assert_eq!(exam, snapshot);
    }

    #[test]
    fn test_validate_ids_reports_duplicates_and_blanks() {
        let exam = exam_with_ids(&["dup", "dup", ""], &[]);
        let validation = validate_ids(&exam);
        assert!(!validation.is_valid());
        assert_eq!(validation.duplicate_ids.len(), 1);
        assert_eq!(validation.empty_ids.len(), 1);
        assert!(validation.summary().contains("blank"));
    }
}
