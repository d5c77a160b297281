//! File-backed message source.
//!
//! Catalogs live at `<base_path>/<language>/<catalog>.mo` (or `.po`); the
//! message category is the gettext context inside that file.

use super::{CatalogError, MoFile, PoFile};
use crate::i18n::{Locale, LookupMetrics};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, warn};

/// Translations of one category in one language.
pub type Messages = HashMap<String, String>;

/// Something that can look up translated messages.
pub trait MessageSource: Send + Sync {
    /// Language the untranslated messages are written in.
    fn source_language(&self) -> &Locale;

    /// Look up the translation of `message`.
    ///
    /// `Ok(None)` means there is no (non-empty) translation and the caller
    /// should use the source message.
    fn translate(
        &self,
        category: &str,
        message: &str,
        language: &Locale,
    ) -> Result<Option<String>, CatalogError>;
}

/// External cache for loaded message tables.
pub trait MessageCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Arc<Messages>>;
    fn set(&self, key: &str, messages: Arc<Messages>);
}

/// Process-local `MessageCache`.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Arc<Messages>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached tables.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MessageCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Arc<Messages>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, messages: Arc<Messages>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), messages);
    }
}

/// Message source reading gettext MO or PO files.
pub struct GettextMessageSource {
    base_path: PathBuf,
    catalog: String,
    use_mo_file: bool,
    source_language: Locale,
    force_translation: bool,
    cache: Option<Arc<dyn MessageCache>>,
    metrics: Arc<LookupMetrics>,
    loaded: Mutex<HashMap<String, Arc<Messages>>>,
}

impl GettextMessageSource {
    /// Create a source reading `<base_path>/<language>/messages.mo`.
    pub fn new(base_path: impl Into<PathBuf>, source_language: Locale) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: "messages".to_string(),
            use_mo_file: true,
            source_language,
            force_translation: false,
            cache: None,
            metrics: Arc::new(LookupMetrics::new()),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Set the catalog file name (without extension).
    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = catalog.into();
        self
    }

    /// Read `.mo` files (`true`, default) or `.po` files (`false`).
    pub fn with_mo_file(mut self, use_mo_file: bool) -> Self {
        self.use_mo_file = use_mo_file;
        self
    }

    /// Translate even when the target language is the source language.
    pub fn with_force_translation(mut self, force: bool) -> Self {
        self.force_translation = force;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn MessageCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<LookupMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<LookupMetrics> {
        &self.metrics
    }

    /// Path of the catalog file for `language`.
    pub fn message_file_path(&self, language: &Locale) -> PathBuf {
        let extension = if self.use_mo_file { "mo" } else { "po" };
        self.base_path
            .join(language.code())
            .join(format!("{}.{}", self.catalog, extension))
    }

    /// Messages of `category` in `language`, loading them on first use.
    pub fn messages(&self, category: &str, language: &Locale) -> Result<Arc<Messages>, CatalogError> {
        let key = format!("{}/{}", language, category);
        // Held across the load so concurrent first lookups read the files once.
        let mut memo = self.memo();
        if let Some(messages) = memo.get(&key) {
            return Ok(Arc::clone(messages));
        }

        let cache_key = format!(
            "gettext:{}:{}:{}",
            self.base_path.display(),
            self.catalog,
            key
        );
        let cached = self.cache.as_ref().and_then(|cache| {
            let hit = cache.get(&cache_key);
            if hit.is_some() {
                self.metrics.record_cache_hit();
            } else {
                self.metrics.record_cache_miss();
            }
            hit
        });

        let messages = match cached {
            Some(messages) => messages,
            None => {
                let messages = Arc::new(self.load_messages(category, language)?);
                if let Some(cache) = &self.cache {
                    cache.set(&cache_key, Arc::clone(&messages));
                }
                messages
            }
        };

        memo.insert(key, Arc::clone(&messages));
        Ok(messages)
    }

    fn memo(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Messages>>> {
        self.loaded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load a language, completing it from its fallback language.
    ///
    /// `de-CH` falls back to `de`; when the requested language is the base
    /// of the source language (`en` for `en-US`), the source language file
    /// is the fallback.
    fn load_messages(&self, category: &str, language: &Locale) -> Result<Messages, CatalogError> {
        let path = self.message_file_path(language);
        let messages = self.load_file(&path, category)?;

        let fallback = language.base();
        let source_base = self.source_language.base();

        if fallback != *language {
            self.load_fallback(category, language, &fallback, messages, &path)
        } else if *language == source_base && source_base != self.source_language {
            let source_language = self.source_language.clone();
            self.load_fallback(category, language, &source_language, messages, &path)
        } else {
            if messages.is_none() {
                warn!(
                    "The message file for category '{}' does not exist: {}",
                    category,
                    path.display()
                );
            }
            Ok(messages.unwrap_or_default())
        }
    }

    fn load_fallback(
        &self,
        category: &str,
        language: &Locale,
        fallback: &Locale,
        messages: Option<Messages>,
        original_path: &Path,
    ) -> Result<Messages, CatalogError> {
        let fallback_path = self.message_file_path(fallback);
        let fallback_messages = self.load_file(&fallback_path, category)?;

        match (messages, fallback_messages) {
            (None, None) => {
                if *fallback != self.source_language && *language != self.source_language {
                    warn!(
                        "The message file for category '{}' does not exist: {} Fallback file does not exist as well: {}",
                        category,
                        original_path.display(),
                        fallback_path.display()
                    );
                }
                Ok(Messages::new())
            }
            (Some(messages), None) => Ok(messages),
            (None, Some(fallback_messages)) => Ok(fallback_messages),
            (Some(messages), Some(fallback_messages)) if messages.is_empty() => {
                Ok(fallback_messages)
            }
            (Some(mut messages), Some(fallback_messages)) => {
                for (key, value) in fallback_messages {
                    let missing = messages.get(&key).map_or(true, String::is_empty);
                    if !value.is_empty() && missing {
                        messages.insert(key, value);
                    }
                }
                Ok(messages)
            }
        }
    }

    /// Read one file; `Ok(None)` when it does not exist.
    fn load_file(&self, path: &Path, category: &str) -> Result<Option<Messages>, CatalogError> {
        if !path.is_file() {
            debug!("No catalog at {}", path.display());
            return Ok(None);
        }

        let messages = if self.use_mo_file {
            MoFile::default().load(path, category)?
        } else {
            PoFile.load(path, category)?
        };
        self.metrics.record_catalog_load();
        Ok(Some(messages))
    }
}

impl MessageSource for GettextMessageSource {
    fn source_language(&self) -> &Locale {
        &self.source_language
    }

    fn translate(
        &self,
        category: &str,
        message: &str,
        language: &Locale,
    ) -> Result<Option<String>, CatalogError> {
        if !self.force_translation && *language == self.source_language {
            return Ok(None);
        }

        let messages = self.messages(category, language)?;
        match messages.get(message) {
            Some(translation) if !translation.is_empty() => Ok(Some(translation.clone())),
            _ => {
                self.metrics.record_missing_translation();
                debug!(
                    "Missing translation for '{}' in category '{}' ({})",
                    message, category, language
                );
                Ok(None)
            }
        }
    }
}
