//! Document-type format rules and field extraction from raw recognized text.
//!
//! Optical recognition emits noisy text in reading order (top-to-bottom,
//! left-to-right). A [`DocumentTypeSpec`] knows the format rule for one
//! document kind and pulls the canonical field value out of that noise.
//!
//! When the text contains more than one disjoint match, the FIRST match in
//! reading order is taken. Zero matches is [`DocsnapError::NotFound`].

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DocsnapError, Result};

// Built-in rules, compiled once on first use. A malformed rule here would
// panic at that point; `test_builtin_rules_compile` forces both statics so
// the suite catches it.
static PAN_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]{5}[0-9]{4}[A-Z]").expect("built-in PAN rule compiles"));
static AADHAAR_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[0-9]{4} ?[0-9]{4} ?[0-9]{4}\b").expect("built-in Aadhaar rule compiles")
});

/// The canonical, format-validated substring extracted for a document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFieldValue(String);

impl DocumentFieldValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentFieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a document kind, its format rule, and the record field it
/// maps to.
#[derive(Debug, Clone)]
pub struct DocumentTypeSpec {
    tag: String,
    field_key: String,
    rule: Regex,
    strip_grouping: bool,
}

impl DocumentTypeSpec {
    /// Create a spec from a document tag, storage field key, and format rule.
    ///
    /// The rule is matched against case-normalized (uppercased) text, so
    /// letter classes should be written in upper case.
    pub fn new(
        tag: impl Into<String>,
        field_key: impl Into<String>,
        pattern: &str,
    ) -> Result<Self> {
        let rule = Regex::new(pattern)
            .map_err(|e| DocsnapError::Configuration(format!("invalid format rule: {e}")))?;
        Ok(Self {
            tag: tag.into(),
            field_key: field_key.into(),
            rule,
            strip_grouping: false,
        })
    }

    /// Strip whitespace grouping from the matched value (e.g. `1234 5678`
    /// canonicalizes to `12345678`).
    pub fn strip_grouping(mut self) -> Self {
        self.strip_grouping = true;
        self
    }

    /// Built-in PAN rule: 5 letters, 4 digits, 1 letter; stored under
    /// `pan_card`.
    pub fn pan() -> Self {
        Self {
            tag: "pan".into(),
            field_key: "pan_card".into(),
            rule: PAN_RULE.clone(),
            strip_grouping: false,
        }
    }

    /// Built-in Aadhaar rule: 12 digits, optionally grouped 4-4-4 by spaces;
    /// stored unspaced under `aadhar`.
    pub fn aadhaar() -> Self {
        Self {
            tag: "aadhaar".into(),
            field_key: "aadhar".into(),
            rule: AADHAAR_RULE.clone(),
            strip_grouping: true,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The record field key this document's value is stored under.
    pub fn field_key(&self) -> &str {
        &self.field_key
    }

    /// Find the canonical field value in raw recognized text.
    ///
    /// The text is case-normalized to upper case and searched as-is, so
    /// surrounding noise, whitespace, and newlines are tolerated. Returns
    /// the first match in reading order, or [`DocsnapError::NotFound`].
    pub fn find_field(&self, text: &str) -> Result<DocumentFieldValue> {
        let normalized = text.to_uppercase();
        let matched = self.rule.find(&normalized).ok_or(DocsnapError::NotFound)?;

        let mut value = matched.as_str().to_string();
        if self.strip_grouping {
            value.retain(|c| !c.is_whitespace());
        }

        tracing::debug!(tag = %self.tag, "Matched document field");
        Ok(DocumentFieldValue(value))
    }
}

/// Table of document-type specs keyed by document tag.
#[derive(Debug, Clone)]
pub struct SpecRegistry {
    specs: HashMap<String, DocumentTypeSpec>,
}

impl SpecRegistry {
    /// Registry with the built-in document types (`pan`, `aadhaar`).
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(DocumentTypeSpec::pan());
        registry.register(DocumentTypeSpec::aadhaar());
        registry
    }

    pub fn empty() -> Self {
        Self {
            specs: HashMap::new(),
        }
    }

    /// Register a spec under its tag, replacing any previous entry.
    pub fn register(&mut self, spec: DocumentTypeSpec) {
        self.specs.insert(spec.tag.clone(), spec);
    }

    pub fn get(&self, tag: &str) -> Option<&DocumentTypeSpec> {
        self.specs.get(tag)
    }
}

impl Default for SpecRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules_compile() {
        // Forces both lazy statics; a malformed built-in rule panics here
        // instead of in production.
        assert_eq!(DocumentTypeSpec::pan().field_key(), "pan_card");
        assert_eq!(DocumentTypeSpec::aadhaar().field_key(), "aadhar");
    }

    #[test]
    fn test_pan_extracted_from_noisy_text() {
        let spec = DocumentTypeSpec::pan();
        let value = spec.find_field("  \n ABCDE1234F \n").unwrap();
        assert_eq!(value.as_str(), "ABCDE1234F");
    }

    #[test]
    fn test_no_match_is_not_found() {
        let spec = DocumentTypeSpec::pan();
        assert!(matches!(
            spec.find_field("no id here"),
            Err(DocsnapError::NotFound)
        ));
    }

    #[test]
    fn test_case_normalized_to_upper() {
        let spec = DocumentTypeSpec::pan();
        let value = spec.find_field("abcde1234f").unwrap();
        assert_eq!(value.as_str(), "ABCDE1234F");
    }

    #[test]
    fn test_first_match_in_reading_order_wins() {
        let spec = DocumentTypeSpec::pan();
        let text = "INCOME TAX DEPT\nABCDE1234F\nZYXWV9876Q\n";
        let value = spec.find_field(text).unwrap();
        assert_eq!(value.as_str(), "ABCDE1234F");
    }

    #[test]
    fn test_pan_embedded_in_surrounding_tokens() {
        let spec = DocumentTypeSpec::pan();
        let value = spec
            .find_field("Permanent Account Number: ABCDE1234F (card)")
            .unwrap();
        assert_eq!(value.as_str(), "ABCDE1234F");
    }

    #[test]
    fn test_aadhaar_grouping_stripped() {
        let spec = DocumentTypeSpec::aadhaar();
        let value = spec.find_field("GOVT OF INDIA\n2345 6789 0123\n").unwrap();
        assert_eq!(value.as_str(), "234567890123");
    }

    #[test]
    fn test_aadhaar_unspaced_accepted() {
        let spec = DocumentTypeSpec::aadhaar();
        let value = spec.find_field("234567890123").unwrap();
        assert_eq!(value.as_str(), "234567890123");
    }

    #[test]
    fn test_invalid_rule_rejected() {
        assert!(matches!(
            DocumentTypeSpec::new("x", "x_field", "("),
            Err(DocsnapError::Configuration(_))
        ));
    }

    #[test]
    fn test_registry_builtin_tags() {
        let registry = SpecRegistry::builtin();
        assert_eq!(registry.get("pan").unwrap().field_key(), "pan_card");
        assert_eq!(registry.get("aadhaar").unwrap().field_key(), "aadhar");
        assert!(registry.get("passport").is_none());
    }
}
