//! Structural validation of a resolved exam model.

use util::exam_model::{ExamModel, ModuleType};

/// Check the structural invariants a gradable exam must satisfy.
///
/// Hard failures flip the flag: a blank id or name, or an exam with no
/// modules at all. Content emptiness inside a module (no questions, or
/// questions without operation points) is only warned about so an otherwise
/// gradable exam is not blocked by one unfinished module.
pub fn validate(exam: &ExamModel) -> (bool, String) {
    if exam.id.trim().is_empty() {
        return (false, "exam model is missing an id".to_string());
    }
    if exam.name.trim().is_empty() {
        return (false, "exam model is missing a name".to_string());
    }
    if exam.modules.is_empty() {
        return (false, "exam model contains no modules".to_string());
    }

    for module_type in [
        ModuleType::Windows,
        ModuleType::PowerPoint,
        ModuleType::Excel,
        ModuleType::Word,
        ModuleType::CSharp,
    ] {
        if let Some(module) = exam.find_module(module_type) {
            if module.questions.is_empty() {
                tracing::warn!(
                    module = %module.name,
                    "module contains no questions"
                );
            } else if module
                .questions
                .iter()
                .all(|q| q.operation_points.is_empty())
            {
                tracing::warn!(
                    module = %module.name,
                    "module questions carry no operation points"
                );
            }
        }
    }

    let message = format!(
        "exam '{}' validated: {} module(s), {} question(s), {} operation point(s)",
        exam.name,
        exam.modules.len(),
        exam.question_count(),
        exam.operation_point_count()
    );
    (true, message)
}
