//! Message translation entry point.
//!
//! A `Translator` routes a category to the message source registered for it
//! and formats the result with the caller's parameters.

use super::formatter::{FormatError, MessageFormatter};
use super::{Args, Locale, LookupMetrics};
use crate::gettext::{CatalogError, MessageSource};
use regex::{Captures, Regex};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::warn;

static ICU_PATTERN_REGEX: OnceLock<Regex> = OnceLock::new();
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

/// Errors returned by `Translator`.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("no message source is registered for category '{0}'")]
    NoMessageSource(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Translates and formats messages.
///
/// Sources are registered under a category pattern: an exact category name,
/// a prefix ending in `*` (`app/*`), or `*` alone. Lookup prefers the exact
/// name, then the first matching prefix in registration order, then `*`.
pub struct Translator {
    language: Locale,
    sources: Vec<(String, Arc<dyn MessageSource>)>,
    metrics: Arc<LookupMetrics>,
}

impl Translator {
    /// Create a translator whose default target language is `language`.
    pub fn new(language: Locale) -> Self {
        Self {
            language,
            sources: Vec::new(),
            metrics: Arc::new(LookupMetrics::new()),
        }
    }

    /// Register `source` for the categories matched by `pattern`.
    pub fn with_source(mut self, pattern: impl Into<String>, source: Arc<dyn MessageSource>) -> Self {
        self.sources.push((pattern.into(), source));
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<LookupMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn language(&self) -> &Locale {
        &self.language
    }

    pub fn metrics(&self) -> &Arc<LookupMetrics> {
        &self.metrics
    }

    /// The source responsible for `category`.
    pub fn message_source(&self, category: &str) -> Result<&Arc<dyn MessageSource>, TranslateError> {
        let exact = self
            .sources
            .iter()
            .find(|(pattern, _)| pattern == category);
        let prefixed = || {
            self.sources.iter().find(|(pattern, _)| {
                pattern.len() > 1
                    && pattern
                        .strip_suffix('*')
                        .is_some_and(|prefix| category.starts_with(prefix))
            })
        };
        let any = || self.sources.iter().find(|(pattern, _)| pattern == "*");

        exact
            .or_else(prefixed)
            .or_else(any)
            .map(|(_, source)| source)
            .ok_or_else(|| TranslateError::NoMessageSource(category.to_string()))
    }

    /// Translate `message` into the default language.
    pub fn t(&self, category: &str, message: &str, params: &Args) -> Result<String, TranslateError> {
        self.translate(category, message, params, &self.language)
    }

    /// Translate `message` into `language` and format it with `params`.
    ///
    /// Without a translation the source message is formatted in the source
    /// language.
    pub fn translate(
        &self,
        category: &str,
        message: &str,
        params: &Args,
        language: &Locale,
    ) -> Result<String, TranslateError> {
        let source = self.message_source(category)?;
        match source.translate(category, message, language)? {
            Some(translation) => self.format(&translation, params, language),
            None => self.format(message, params, source.source_language()),
        }
    }

    /// Format `message` with `params`.
    ///
    /// Patterns with typed placeholders (`{n, plural, ...}`) go through the
    /// ICU fallback formatter. If that rejects the pattern, the message is
    /// returned unchanged. Other patterns only get `{name}` substitution.
    pub fn format(
        &self,
        message: &str,
        params: &Args,
        language: &Locale,
    ) -> Result<String, TranslateError> {
        if params.is_empty() {
            return Ok(message.to_string());
        }

        let icu = ICU_PATTERN_REGEX
            .get_or_init(|| Regex::new(r"\{\s*[\w.]+\s*,").expect("valid ICU pattern regex"));
        if icu.is_match(message) {
            let mut formatter = MessageFormatter::new();
            return match formatter.format(message, params)? {
                Some(formatted) => Ok(formatted),
                None => {
                    self.metrics.record_format_failure();
                    warn!(
                        "Formatting message for language '{}' failed with error: {}. The message being formatted was: {}.",
                        language,
                        formatter.error_message(),
                        message
                    );
                    Ok(message.to_string())
                }
            };
        }

        let placeholder = PLACEHOLDER_REGEX
            .get_or_init(|| Regex::new(r"\{([^{}]*)\}").expect("valid placeholder regex"));
        let replaced = placeholder.replace_all(message, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        });
        Ok(replaced.into_owned())
    }
}
