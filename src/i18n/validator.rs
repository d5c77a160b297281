//! Translation quality validation.
//!
//! Checks that a translated pattern still parses and uses the same
//! arguments as its source message, including arguments referenced inside
//! `select` and `plural` bodies.

use super::formatter::{tokenize, FormatError, Segment};
use crate::gettext::{split_key, MessageCatalog};
use std::collections::BTreeSet;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Critical errors that make the translation unusable
    pub errors: Vec<String>,

    /// Non-critical warnings about potential issues
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if the report has any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }

    fn prefixed(mut self, prefix: &str) -> Self {
        for message in self.errors.iter_mut().chain(self.warnings.iter_mut()) {
            *message = format!("{prefix}: {message}");
        }
        self
    }

    fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for translated message patterns.
pub struct PlaceholderValidator;

impl PlaceholderValidator {
    /// Validate that `translated` keeps the placeholders of `original`.
    ///
    /// - an unparseable translation is an error
    /// - an empty translation is a warning (it falls back to the source)
    /// - a different set of argument names is a warning
    pub fn validate(original: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::new();

        if translated.is_empty() {
            report
                .warnings
                .push("Translation is empty and will fall back to the source".to_string());
            return report;
        }

        let translated_names = match Self::argument_names(translated) {
            Ok(names) => names,
            Err(e) => {
                report.errors.push(format!("Translation pattern: {e}"));
                return report;
            }
        };
        let original_names = match Self::argument_names(original) {
            Ok(names) => names,
            Err(e) => {
                report.errors.push(format!("Source pattern: {e}"));
                return report;
            }
        };

        if original_names != translated_names {
            report.warnings.push(format!(
                "Placeholder mismatch: original has {:?}, translation has {:?}",
                original_names, translated_names
            ));
        }

        report
    }

    /// Validate every entry of a catalog; messages are prefixed with the key.
    ///
    /// The header entry and plural entries (`singular\0plural`) are skipped.
    pub fn validate_catalog(catalog: &MessageCatalog) -> ValidationReport {
        let mut report = ValidationReport::new();
        for (raw, translated) in catalog.iter() {
            let (context, key) = split_key(raw);
            if key.is_empty() || key.contains('\0') {
                continue;
            }
            let label = match context {
                Some(context) => format!("[{context}] {key}"),
                None => key.to_string(),
            };
            report.merge(Self::validate(key, translated).prefixed(&label));
        }
        report
    }

    /// Argument names used anywhere in a pattern.
    pub fn argument_names(pattern: &str) -> Result<BTreeSet<String>, FormatError> {
        let mut names = BTreeSet::new();
        Self::collect_names(pattern, &mut names)?;
        Ok(names)
    }

    fn collect_names(pattern: &str, names: &mut BTreeSet<String>) -> Result<(), FormatError> {
        for segment in tokenize(pattern)? {
            let Segment::Placeholder(raw) = segment else {
                continue;
            };

            let mut parts = raw.splitn(3, ',');
            names.insert(parts.next().unwrap_or_default().trim().to_string());

            let kind = parts.next().map(str::trim);
            if matches!(kind, Some("select") | Some("plural")) {
                let Some(style) = parts.next() else {
                    continue;
                };
                for choice in tokenize(style)? {
                    if let Segment::Placeholder(body) = choice {
                        Self::collect_names(body, names)?;
                    }
                }
            }
        }
        Ok(())
    }
}
