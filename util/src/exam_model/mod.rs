//! Canonical in-memory exam model.
//!
//! One exam is a tree: `ExamModel` → `ExamModule` → `Question` →
//! `OperationPoint` → `ConfigurationParameter`. The tree is built once per
//! grading run by the ingestion pipeline and treated as read-only afterwards
//! (identifier repair happens in a bounded pre-pass before grading starts),
//! so it can be shared freely across concurrent detector calls.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Module families an exam can contain. Each family maps to one detector
/// implementation, so an unknown module type is a hard error: grading cannot
/// proceed without knowing which detector to dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ModuleType {
    Windows,
    PowerPoint,
    Excel,
    Word,
    CSharp,
}

impl ModuleType {
    /// Legacy integer codes used by older authoring-tool exports.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ModuleType::Windows),
            1 => Some(ModuleType::PowerPoint),
            2 => Some(ModuleType::Excel),
            3 => Some(ModuleType::Word),
            4 => Some(ModuleType::CSharp),
            _ => None,
        }
    }

    /// Resolve a module type from its canonical name (case-insensitive), a
    /// known short name, or a legacy integer code rendered as a string.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "windows" => Some(ModuleType::Windows),
            "powerpoint" | "ppt" => Some(ModuleType::PowerPoint),
            "excel" => Some(ModuleType::Excel),
            "word" => Some(ModuleType::Word),
            "csharp" | "c#" => Some(ModuleType::CSharp),
            other => other.parse::<i64>().ok().and_then(ModuleType::from_code),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Windows => "Windows",
            ModuleType::PowerPoint => "PowerPoint",
            ModuleType::Excel => "Excel",
            ModuleType::Word => "Word",
            ModuleType::CSharp => "CSharp",
        }
    }
}

impl<'de> Deserialize<'de> for ModuleType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(i64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Code(code) => ModuleType::from_code(code)
                .ok_or_else(|| de::Error::custom(format!("unknown module type code: {code}"))),
            Raw::Name(name) => ModuleType::from_name(&name)
                .ok_or_else(|| de::Error::custom(format!("unknown module type: {name}"))),
        }
    }
}

/// Declared type of a configuration parameter value.
///
/// Authoring tools are loose here: values arrive as native names, case
/// variants, English technical synonyms or localized display names, and
/// sometimes as the raw enum ordinal. Unrecognized tags fall back to `Text`
/// so one authoring mistake degrades a single parameter instead of blocking
/// the whole file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ParameterType {
    Number,
    #[default]
    Text,
    Enum,
    Boolean,
    Color,
    Date,
}

impl ParameterType {
    /// Ordinals follow the authoring tool's enum declaration order.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ParameterType::Number),
            1 => Some(ParameterType::Text),
            2 => Some(ParameterType::Enum),
            3 => Some(ParameterType::Boolean),
            4 => Some(ParameterType::Color),
            5 => Some(ParameterType::Date),
            _ => None,
        }
    }

    /// Resolve a declared type from any documented alias.
    ///
    /// Path-like declared types (file/folder/path) collapse onto `Text`:
    /// their values are plain path strings and all path handling happens in
    /// the normalizer, not the type system.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "text" | "string" | "文本" => Some(ParameterType::Text),
            "number" | "int" | "integer" | "double" | "decimal" | "float" | "数字" => {
                Some(ParameterType::Number)
            }
            "boolean" | "bool" | "布尔" | "布尔值" => Some(ParameterType::Boolean),
            "enum" | "枚举" | "multiplechoice" | "multiple_choice" => Some(ParameterType::Enum),
            "color" | "colour" | "颜色" => Some(ParameterType::Color),
            "date" | "datetime" | "日期" => Some(ParameterType::Date),
            "file" | "folder" | "directory" | "path" | "文件" | "文件夹" | "路径" => {
                Some(ParameterType::Text)
            }
            other => other.parse::<i64>().ok().and_then(ParameterType::from_code),
        }
    }

    /// Alias resolution with the documented `Text` fallback.
    pub fn from_name_or_default(name: &str) -> Self {
        ParameterType::from_name(name).unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for ParameterType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(i64),
            Name(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Code(code) => ParameterType::from_code(code).unwrap_or_default(),
            Raw::Name(name) => ParameterType::from_name_or_default(&name),
        })
    }
}

/// Grading mode for a C# question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CSharpQuestionType {
    CodeCompletion,
    Debugging,
    Implementation,
}

impl CSharpQuestionType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "codecompletion" | "code_completion" => Some(CSharpQuestionType::CodeCompletion),
            "debugging" => Some(CSharpQuestionType::Debugging),
            "implementation" => Some(CSharpQuestionType::Implementation),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for CSharpQuestionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        CSharpQuestionType::from_name(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown C# question type: {name}")))
    }
}

/// Root of the exam tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExamModel {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_total_score")]
    pub total_score: f64,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: i64,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modules: Vec<ExamModule>,
}

impl ExamModel {
    /// First module of the given family, if the exam contains one.
    pub fn find_module(&self, module_type: ModuleType) -> Option<&ExamModule> {
        self.modules.iter().find(|m| m.module_type == module_type)
    }

    pub fn question_count(&self) -> usize {
        self.modules.iter().map(|m| m.questions.len()).sum()
    }

    pub fn operation_point_count(&self) -> usize {
        self.modules
            .iter()
            .flat_map(|m| m.questions.iter())
            .map(|q| q.operation_points.len())
            .sum()
    }
}

/// One gradable module (Windows, an Office document kind, or C#).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExamModule {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_question_score")]
    pub score: f64,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    /// Grading mode for C# questions; `None` for every other module family.
    #[serde(default, rename = "csharpQuestionType")]
    pub csharp_question_type: Option<CSharpQuestionType>,
    #[serde(default)]
    pub program_input: Option<String>,
    #[serde(default)]
    pub expected_output: Option<String>,
    #[serde(default)]
    pub code_file_path: Option<String>,
    #[serde(default)]
    pub document_file_path: Option<String>,
    #[serde(default)]
    pub operation_points: Vec<OperationPoint>,
}

/// The atomic knowledge point: one concrete, checkable student action or
/// document property, parameterized by its configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationPoint {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_operation_score")]
    pub score: f64,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    #[serde(default)]
    pub module_type: Option<ModuleType>,
    #[serde(default)]
    pub windows_operation_type: Option<String>,
    #[serde(default)]
    pub power_point_knowledge_type: Option<String>,
    #[serde(default)]
    pub word_knowledge_type: Option<String>,
    #[serde(default)]
    pub excel_knowledge_type: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ConfigurationParameter>,
}

impl OperationPoint {
    /// The operation-type tag relevant to the owning module family, falling
    /// back to the point's name when the family-specific tag is absent.
    pub fn knowledge_type(&self, module_type: ModuleType) -> &str {
        let tag = match module_type {
            ModuleType::Windows => self.windows_operation_type.as_deref(),
            ModuleType::PowerPoint => self.power_point_knowledge_type.as_deref(),
            ModuleType::Word => self.word_knowledge_type.as_deref(),
            ModuleType::Excel => self.excel_knowledge_type.as_deref(),
            ModuleType::CSharp => None,
        };
        tag.filter(|t| !t.trim().is_empty()).unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationParameter {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default)]
    pub parameter_type: ParameterType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

impl ConfigurationParameter {
    /// Effective value: the authored value, or the declared default when the
    /// author left the value blank.
    pub fn effective_value(&self) -> Option<&str> {
        if !self.value.trim().is_empty() {
            return Some(self.value.as_str());
        }
        self.default_value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
    }
}

fn default_true() -> bool {
    true
}

fn default_total_score() -> f64 {
    100.0
}

fn default_duration_minutes() -> i64 {
    120
}

fn default_question_score() -> f64 {
    10.0
}

fn default_operation_score() -> f64 {
    1.0
}
