//! Converter from the authoring tool's export envelope to the canonical
//! exam model.
//!
//! The export wraps the exam object next to a `metadata` block and has grown
//! several legacy spellings over time: a `subjects` list predating `modules`,
//! packed `enumOptions` strings predating option arrays, and `sortOrder`
//! next to `order`. All of them are accepted here so old exports keep
//! grading.

use crate::error::GraderError;
use crate::parsers::tolerant::{
    get_bool, get_datetime, get_f64, get_f64_opt, get_i64, get_opt_string, get_property,
    get_string, get_string_or,
};
use serde_json::Value;
use util::exam_model::{
    CSharpQuestionType, ConfigurationParameter, ExamModel, ExamModule, ModuleType, OperationPoint,
    ParameterType, Question,
};

/// Convert a full designer export (the `exam` + `metadata` envelope).
pub fn convert_exam_export(root: &Value) -> Result<ExamModel, GraderError> {
    let exam = get_property(root, "exam").ok_or_else(|| {
        GraderError::MissingField("designer export is missing the 'exam' object".to_string())
    })?;
    convert_exam(exam)
}

/// Convert an exam object (either the canonical shape or the designer shape).
pub fn convert_exam(exam: &Value) -> Result<ExamModel, GraderError> {
    let mut model = ExamModel {
        id: get_string(exam, "id"),
        name: get_string(exam, "name"),
        description: get_string(exam, "description"),
        total_score: get_f64(exam, "totalScore", 100.0),
        duration_minutes: get_i64(exam, "durationMinutes", 120),
        is_enabled: get_bool(exam, "isEnabled", true),
        tags: get_string(exam, "tags"),
        created_at: get_datetime(exam, "createdAt"),
        updated_at: get_datetime(exam, "updatedAt"),
        modules: Vec::new(),
    };

    if let Some(modules) = get_property(exam, "modules").and_then(Value::as_array) {
        for module in modules {
            model.modules.push(convert_module(module)?);
        }
    } else if let Some(subjects) = get_property(exam, "subjects").and_then(Value::as_array) {
        // Legacy exports list "subjects" instead of modules.
        for subject in subjects {
            model.modules.push(convert_subject(subject)?);
        }
    }

    tracing::debug!(
        exam = %model.name,
        modules = model.modules.len(),
        "converted exam export"
    );
    Ok(model)
}

fn convert_module(module: &Value) -> Result<ExamModule, GraderError> {
    let module_type = parse_module_type(module, "type")?;

    let mut converted = ExamModule {
        id: get_string(module, "id"),
        name: get_string(module, "name"),
        description: get_string(module, "description"),
        module_type,
        score: get_f64(module, "score", 0.0),
        order: get_i64(module, "order", 0),
        is_enabled: get_bool(module, "isEnabled", true),
        questions: Vec::new(),
    };

    if let Some(questions) = get_property(module, "questions").and_then(Value::as_array) {
        for question in questions {
            converted.questions.push(convert_question(question));
        }
    }
    Ok(converted)
}

/// Legacy subject entries carry a free-form `subjectType` rather than a
/// module type; anything unrecognized lands in the Windows family, matching
/// how these exports were originally consumed.
fn convert_subject(subject: &Value) -> Result<ExamModule, GraderError> {
    let subject_type = get_string(subject, "subjectType").to_lowercase();
    let module_type = match subject_type.as_str() {
        "powerpoint" | "ppt" => ModuleType::PowerPoint,
        "word" => ModuleType::Word,
        "excel" => ModuleType::Excel,
        "csharp" | "c#" => ModuleType::CSharp,
        _ => ModuleType::Windows,
    };

    let mut converted = ExamModule {
        id: get_string(subject, "id"),
        name: get_string(subject, "subjectName"),
        description: get_string(subject, "description"),
        module_type,
        score: get_f64(subject, "score", 20.0),
        order: get_i64(subject, "sortOrder", 1),
        is_enabled: get_bool(subject, "isEnabled", true),
        questions: Vec::new(),
    };

    if let Some(questions) = get_property(subject, "questions").and_then(Value::as_array) {
        for question in questions {
            converted.questions.push(convert_question(question));
        }
    }
    Ok(converted)
}

fn convert_question(question: &Value) -> Question {
    let csharp_question_type = get_opt_string(question, "csharpQuestionType")
        .and_then(|name| CSharpQuestionType::from_name(&name));

    let mut converted = Question {
        id: get_string(question, "id"),
        title: get_string(question, "title"),
        content: get_string(question, "content"),
        score: get_f64(question, "score", 10.0),
        order: get_i64(question, "sortOrder", get_i64(question, "order", 1)),
        is_enabled: get_bool(question, "isEnabled", true),
        csharp_question_type,
        program_input: get_opt_string(question, "programInput"),
        expected_output: get_opt_string(question, "expectedOutput"),
        code_file_path: get_opt_string(question, "codeFilePath"),
        document_file_path: get_opt_string(question, "documentFilePath"),
        operation_points: Vec::new(),
    };

    if let Some(points) = get_property(question, "operationPoints").and_then(Value::as_array) {
        for point in points {
            converted.operation_points.push(convert_operation_point(point));
        }
    }
    converted
}

fn convert_operation_point(point: &Value) -> OperationPoint {
    let mut converted = OperationPoint {
        id: get_string(point, "id"),
        name: get_string(point, "name"),
        description: get_string(point, "description"),
        score: get_f64(point, "score", 1.0),
        order: get_i64(point, "order", 1),
        is_enabled: get_bool(point, "isEnabled", true),
        module_type: parse_module_type(point, "moduleType").ok(),
        windows_operation_type: get_opt_string(point, "windowsOperationType"),
        power_point_knowledge_type: get_opt_string(point, "powerPointKnowledgeType"),
        word_knowledge_type: get_opt_string(point, "wordKnowledgeType"),
        excel_knowledge_type: get_opt_string(point, "excelKnowledgeType"),
        parameters: Vec::new(),
    };

    if let Some(parameters) = get_property(point, "parameters").and_then(Value::as_array) {
        for parameter in parameters {
            converted.parameters.push(convert_parameter(parameter));
        }
    }
    converted
}

fn convert_parameter(parameter: &Value) -> ConfigurationParameter {
    let parameter_type = match get_property(parameter, "type") {
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(ParameterType::from_code)
            .unwrap_or_default(),
        Some(Value::String(s)) => ParameterType::from_name_or_default(s),
        _ => ParameterType::Text,
    };

    let options = match get_property(parameter, "options") {
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| v.as_str().unwrap_or_default().to_string())
            .collect(),
        _ => get_opt_string(parameter, "enumOptions")
            .map(|packed| parse_enum_options(&packed))
            .unwrap_or_default(),
    };

    ConfigurationParameter {
        id: get_string(parameter, "id"),
        name: get_string(parameter, "name"),
        display_name: get_string_or(parameter, "displayName", &get_string(parameter, "name")),
        value: get_string(parameter, "value"),
        parameter_type,
        is_required: get_bool(parameter, "isRequired", false),
        default_value: get_opt_string(parameter, "defaultValue"),
        options,
        min_value: get_f64_opt(parameter, "minValue"),
        max_value: get_f64_opt(parameter, "maxValue"),
        order: get_i64(parameter, "order", 0),
        is_visible: get_bool(parameter, "isVisible", true),
    }
}

fn parse_module_type(value: &Value, key: &str) -> Result<ModuleType, GraderError> {
    match get_property(value, key) {
        Some(Value::Number(n)) => {
            let code = n.as_i64().unwrap_or(-1);
            ModuleType::from_code(code).ok_or_else(|| {
                GraderError::InvalidJson(format!("unknown module type code: {code}"))
            })
        }
        Some(Value::String(s)) => ModuleType::from_name(s)
            .ok_or_else(|| GraderError::InvalidJson(format!("unknown module type: {s}"))),
        _ => Err(GraderError::MissingField(format!(
            "missing module type field '{key}'"
        ))),
    }
}

/// Page-number format option sets embed commas in individual options
/// ("1,2,3..."), so they are extracted before the plain comma split.
const PAGE_NUMBER_PATTERNS: [&str; 5] =
    ["1,2,3...", "a,b,c...", "A,B,C...", "i,ii,iii...", "I,II,III..."];

fn parse_enum_options(packed: &str) -> Vec<String> {
    if packed.is_empty() {
        return Vec::new();
    }

    if PAGE_NUMBER_PATTERNS.iter().any(|p| packed.contains(p)) {
        let mut options: Vec<String> = Vec::new();
        let mut remaining = packed.to_string();
        for pattern in PAGE_NUMBER_PATTERNS {
            if remaining.contains(pattern) {
                options.push(pattern.to_string());
                remaining = remaining.replace(pattern, "").replace(",,", ",");
            }
        }
        for option in remaining.split(',') {
            let trimmed = option.trim();
            if !trimmed.is_empty() && !options.iter().any(|o| o == trimmed) {
                options.push(trimmed.to_string());
            }
        }
        return options;
    }

    packed.split(',').map(|s| s.trim().to_string()).collect()
}
