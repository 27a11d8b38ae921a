//! Exam file format sniffing.
//!
//! Classification is cheap and deliberately shallow: extension first, then a
//! content probe only where the extension is ambiguous. A `.json` file may
//! still turn out to be a designer export; the parser reclassifies it once
//! the envelope shape is visible.

use std::fs;
use std::path::Path;

/// The closed set of exam-definition formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamFileFormat {
    /// Canonical JSON, or a designer JSON export (distinguished during parsing).
    Json,
    /// Plain XML with no recognizable designer marker.
    Xml,
    /// The authoring tool's project/export file.
    DesignerProject,
    /// Unrecognized extension or unreadable file; fatal for this run.
    Unknown,
}

impl ExamFileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamFileFormat::Json => "Json",
            ExamFileFormat::Xml => "Xml",
            ExamFileFormat::DesignerProject => "DesignerProject",
            ExamFileFormat::Unknown => "Unknown",
        }
    }
}

/// Content markers identifying a designer export inside an XML file.
const DESIGNER_MARKERS: [&str; 2] = ["<ExamExport", "Designer"];

/// Classify a file by extension and, for XML, by content marker.
pub fn detect_format(path: &Path) -> ExamFileFormat {
    if !path.exists() {
        return ExamFileFormat::Unknown;
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "json" => ExamFileFormat::Json,
        "xml" => match fs::read_to_string(path) {
            Ok(content) => {
                if DESIGNER_MARKERS.iter().any(|m| content.contains(m)) {
                    ExamFileFormat::DesignerProject
                } else {
                    ExamFileFormat::Xml
                }
            }
            Err(_) => ExamFileFormat::Xml,
        },
        _ => ExamFileFormat::Unknown,
    }
}
