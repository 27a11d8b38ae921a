//! Operation-point parameter normalization.
//!
//! Different authoring tools label the same concept with different keys
//! (`FilePath` vs `TargetPath`, `NewFileName` vs `NewName`). Detectors only
//! ever ask for the canonical key; the lookup probes the canonical name
//! first and then every documented legacy alias, and a missing required
//! parameter produces a message naming every accepted spelling.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use util::exam_model::OperationPoint;

/// Canonical parameter key → accepted legacy aliases.
static PARAMETER_ALIASES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        ("TargetPath", &["FilePath", "DestinationPath"][..]),
        ("SourcePath", &[][..]),
        ("OriginalName", &["OriginalFileName"][..]),
        ("NewName", &["NewFileName"][..]),
        ("CreateType", &["ItemType"][..]),
        ("ItemName", &[][..]),
        ("CreatePath", &[][..]),
        ("ShortcutPath", &[][..]),
        ("PropertyType", &[][..]),
        ("PropertyValue", &[][..]),
    ])
});

/// Normalized view of an operation point's configuration parameters.
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    values: HashMap<String, String>,
}

impl ParameterSet {
    /// Collect parameters with a non-blank name and an effective value
    /// (authored value, or the declared default).
    pub fn from_operation_point(operation: &OperationPoint) -> Self {
        let mut values = HashMap::new();
        for parameter in &operation.parameters {
            if parameter.name.trim().is_empty() {
                continue;
            }
            if let Some(value) = parameter.effective_value() {
                values.insert(parameter.name.clone(), value.to_string());
            }
        }
        ParameterSet { values }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ParameterSet {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.values.get(key) {
            return Some(value.as_str());
        }
        self.values
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Value under the canonical key, falling back to known aliases.
    pub fn get(&self, canonical: &str) -> Option<&str> {
        if let Some(value) = self.lookup(canonical).filter(|v| !v.is_empty()) {
            return Some(value);
        }
        let aliases = PARAMETER_ALIASES.get(canonical).copied().unwrap_or(&[]);
        aliases
            .iter()
            .find_map(|alias| self.lookup(alias).filter(|v| !v.is_empty()))
    }

    /// Like [`ParameterSet::get`], but a descriptive error when absent.
    pub fn require(&self, canonical: &str) -> Result<&str, String> {
        self.get(canonical).ok_or_else(|| {
            let aliases = PARAMETER_ALIASES.get(canonical).copied().unwrap_or(&[]);
            if aliases.is_empty() {
                format!("missing required parameter: {canonical}")
            } else {
                format!(
                    "missing required parameter: {canonical} (or {})",
                    aliases.join(", ")
                )
            }
        })
    }

    pub fn get_or(&self, canonical: &str, default: &str) -> String {
        self.get(canonical).unwrap_or(default).to_string()
    }

    /// Boolean parsing accepting the loose truthy spellings authoring tools
    /// produce.
    pub fn get_bool(&self, canonical: &str, default: bool) -> bool {
        match self.get(canonical) {
            Some(value) => matches!(
                value.trim().to_lowercase().as_str(),
                "1" | "yes" | "true" | "on" | "enabled"
            ),
            None => default,
        }
    }

    pub fn get_i64(&self, canonical: &str, default: i64) -> i64 {
        self.get(canonical)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw key/value view, recorded on results for diagnostics.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.values.clone()
    }
}

/// Accepted file-type enum values (localized and English spellings).
pub fn is_valid_file_type(file_type: &str) -> bool {
    ["文件", "文件夹", "File", "Folder", "Directory"]
        .iter()
        .any(|v| v.eq_ignore_ascii_case(file_type))
}

/// True when the file-type value names a folder rather than a file.
pub fn is_folder_type(file_type: &str) -> bool {
    ["文件夹", "Folder", "Directory"]
        .iter()
        .any(|v| v.eq_ignore_ascii_case(file_type))
}

/// Accepted property-type enum values for attribute checks.
pub fn is_valid_property_type(property_type: &str) -> bool {
    [
        "只读", "隐藏", "系统", "存档", "ReadOnly", "Hidden", "System", "Archive",
    ]
    .iter()
    .any(|v| v.eq_ignore_ascii_case(property_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key_wins_over_alias() {
        let params =
            ParameterSet::from_pairs([("TargetPath", "canonical.txt"), ("FilePath", "alias.txt")]);
        assert_eq!(params.get("TargetPath"), Some("canonical.txt"));
    }

    #[test]
    fn test_alias_probed_when_canonical_absent() {
        let params = ParameterSet::from_pairs([("FilePath", "legacy.txt")]);
        assert_eq!(params.get("TargetPath"), Some("legacy.txt"));

        let params = ParameterSet::from_pairs([("DestinationPath", "\\WINDOWS\\2")]);
        assert_eq!(params.get("TargetPath"), Some("\\WINDOWS\\2"));

        let params = ParameterSet::from_pairs([("NewFileName", "chcp2.com")]);
        assert_eq!(params.get("NewName"), Some("chcp2.com"));
    }

    #[test]
    fn test_missing_parameter_names_all_accepted_keys() {
        let params = ParameterSet::default();
        let err = params.require("TargetPath").unwrap_err();
        assert!(err.contains("TargetPath"));
        assert!(err.contains("FilePath"));
        assert!(err.contains("DestinationPath"));
    }

    #[test]
    fn test_case_insensitive_key_lookup() {
        let params = ParameterSet::from_pairs([("targetpath", "x.txt")]);
        assert_eq!(params.get("TargetPath"), Some("x.txt"));
    }

    #[test]
    fn test_bool_parsing_accepts_loose_spellings() {
        let params = ParameterSet::from_pairs([
            ("A", "true"),
            ("B", "1"),
            ("C", "enabled"),
            ("D", "false"),
        ]);
        assert!(params.get_bool("A", false));
        assert!(params.get_bool("B", false));
        assert!(params.get_bool("C", false));
        assert!(!params.get_bool("D", true));
        assert!(params.get_bool("Missing", true));
    }

    #[test]
    fn test_enum_value_tables() {
        assert!(is_valid_file_type("文件夹"));
        assert!(is_valid_file_type("folder"));
        assert!(!is_valid_file_type("archive"));
        assert!(is_folder_type("Directory"));
        assert!(!is_folder_type("文件"));
        assert!(is_valid_property_type("只读"));
        assert!(is_valid_property_type("hidden"));
        assert!(!is_valid_property_type("sticky"));
    }
}
