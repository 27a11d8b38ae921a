//! Encoding-resilient file reading.
//!
//! Exam files come out of authoring tools on machines with legacy locale
//! encodings, so a plain UTF-8 read can silently produce mojibake. The reader
//! tries an explicitly constructed, ordered list of decoders and accepts the
//! first result free of replacement artifacts. The decoder list is owned by
//! the reader instance; nothing is registered process-wide.

use crate::error::GraderError;
use encoding_rs::Encoding;
use std::fs;
use std::path::Path;
use util::grading_config::EncodingPolicy;

/// Reads text files by trying candidate encodings in order.
pub struct EncodingReader {
    encodings: Vec<&'static Encoding>,
    policy: EncodingPolicy,
}

impl EncodingReader {
    pub fn new(encodings: Vec<&'static Encoding>, policy: EncodingPolicy) -> Self {
        EncodingReader { encodings, policy }
    }

    /// Default candidate list: UTF-8 first, then the legacy Chinese locale
    /// encodings the authoring tools are known to emit. GB18030 doubles as
    /// the GB2312 fallback since it is a superset.
    pub fn with_default_candidates(policy: EncodingPolicy) -> Self {
        EncodingReader::new(
            vec![encoding_rs::UTF_8, encoding_rs::GBK, encoding_rs::GB18030],
            policy,
        )
    }

    /// Read `path`, returning the first artifact-free decode.
    ///
    /// When every candidate produces artifacts, the lenient policy falls back
    /// to lossy UTF-8 rather than failing outright; callers are expected to
    /// run the model validator on whatever comes back. The strict policy
    /// returns [`GraderError::EncodingExhausted`] instead.
    pub fn read_to_string(&self, path: &Path) -> Result<String, GraderError> {
        let bytes = fs::read(path)
            .map_err(|e| GraderError::IoError(format!("Failed to read {path:?}: {e}")))?;

        for encoding in &self.encodings {
            let (decoded, _, had_errors) = encoding.decode(&bytes);
            if !had_errors && !has_artifacts(&decoded) {
                tracing::debug!(encoding = encoding.name(), ?path, "decoded exam file");
                return Ok(decoded.into_owned());
            }
        }

        match self.policy {
            EncodingPolicy::Lenient => {
                tracing::warn!(
                    ?path,
                    "no candidate encoding decoded cleanly, falling back to lossy UTF-8"
                );
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            EncodingPolicy::Strict => Err(GraderError::EncodingExhausted(format!(
                "No candidate encoding decoded {path:?} without replacement artifacts"
            ))),
        }
    }
}

/// Replacement artifacts left behind by a wrong decode: the Unicode
/// replacement character, or the doubled "??" substitution some converters
/// emit instead.
fn has_artifacts(text: &str) -> bool {
    text.contains('\u{FFFD}') || text.contains("??")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(bytes).expect("write temp file");
        file
    }

    #[test]
    fn test_reads_plain_utf8() {
        let file = write_temp("{\"name\": \"exam\"}".as_bytes());
        let reader = EncodingReader::with_default_candidates(EncodingPolicy::Lenient);
        let text = reader.read_to_string(file.path()).unwrap();
        assert_eq!(text, "{\"name\": \"exam\"}");
    }

    #[test]
    fn test_falls_through_to_gbk() {
        // "中文" encoded as GBK; invalid as UTF-8.
        let file = write_temp(&[0xD6, 0xD0, 0xCE, 0xC4]);
        let reader = EncodingReader::with_default_candidates(EncodingPolicy::Lenient);
        let text = reader.read_to_string(file.path()).unwrap();
        assert_eq!(text, "中文");
        assert!(!text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_doubled_question_marks_count_as_artifacts() {
        assert!(has_artifacts("name: ??"));
        assert!(has_artifacts("broken \u{FFFD} text"));
        assert!(!has_artifacts("what?"));
    }

    #[test]
    fn test_lenient_fallback_on_exhaustion() {
        // 0xFF 0xFE alone is invalid UTF-8 and decodes to artifacts elsewhere.
        let file = write_temp(&[b'a', 0xFF, b'?', b'?']);
        let reader = EncodingReader::with_default_candidates(EncodingPolicy::Lenient);
        let text = reader.read_to_string(file.path()).unwrap();
        assert!(text.starts_with('a'));
    }

    #[test]
    fn test_strict_policy_reports_exhaustion() {
        let file = write_temp(&[b'a', 0xFF, b'?', b'?']);
        let reader = EncodingReader::with_default_candidates(EncodingPolicy::Strict);
        match reader.read_to_string(file.path()) {
            Err(GraderError::EncodingExhausted(msg)) => {
                assert!(msg.contains("replacement artifacts"));
            }
            other => panic!("expected EncodingExhausted, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let reader = EncodingReader::with_default_candidates(EncodingPolicy::Lenient);
        match reader.read_to_string(Path::new("/nonexistent/exam.json")) {
            Err(GraderError::IoError(msg)) => assert!(msg.contains("Failed to read")),
            other => panic!("expected IoError, got {other:?}"),
        }
    }
}
