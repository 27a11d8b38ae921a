//!
//! Parsers Module
//!
//! Converts raw exam-definition text into the canonical [`util::exam_model::ExamModel`] tree.
//!
//! - [`tolerant`]: lenient JSON pre-processing (comments, trailing commas) and
//!   case-insensitive property probing over [`serde_json::Value`].
//! - [`designer`]: converter for the authoring tool's export envelope.
//! - [`exam_parser`]: entry points keyed by detected file format.

pub mod designer;
pub mod exam_parser;
pub mod tolerant;
