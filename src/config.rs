use crate::gettext::{Endianness, GettextMessageSource, MoFile};
use crate::i18n::{Locale, LookupMetrics, Translator};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Config {
    // Catalog location
    pub base_path: PathBuf,
    pub catalog: String,
    pub use_mo_file: bool,

    // Languages
    pub source_language: Locale,
    pub language: Locale,
    pub force_translation: bool,

    // MO writer
    pub big_endian: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let source_language = Locale::parse(
            &std::env::var("I18N_SOURCE_LANGUAGE").unwrap_or_else(|_| "en-US".to_string()),
        )
        .context("I18N_SOURCE_LANGUAGE is not a valid locale")?;

        let language = match std::env::var("I18N_LANGUAGE") {
            Ok(code) => Locale::parse(&code).context("I18N_LANGUAGE is not a valid locale")?,
            Err(_) => source_language.clone(),
        };

        Ok(Self {
            base_path: std::env::var("I18N_BASE_PATH")
                .unwrap_or_else(|_| "messages".to_string())
                .into(),
            catalog: std::env::var("I18N_CATALOG").unwrap_or_else(|_| "messages".to_string()),
            use_mo_file: env_flag("I18N_USE_MO_FILE", true)?,

            source_language,
            language,
            force_translation: env_flag("I18N_FORCE_TRANSLATION", false)?,

            big_endian: env_flag("I18N_BIG_ENDIAN", false)?,
        })
    }

    /// Byte order used when writing MO files.
    pub fn endianness(&self) -> Endianness {
        if self.big_endian {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    pub fn mo_file(&self) -> MoFile {
        MoFile::new(self.endianness())
    }

    pub fn message_source(&self, metrics: Arc<LookupMetrics>) -> GettextMessageSource {
        GettextMessageSource::new(self.base_path.clone(), self.source_language.clone())
            .with_catalog(self.catalog.clone())
            .with_mo_file(self.use_mo_file)
            .with_force_translation(self.force_translation)
            .with_metrics(metrics)
    }

    /// A translator serving every category from the configured catalog.
    pub fn translator(&self) -> Translator {
        let metrics = Arc::new(LookupMetrics::new());
        let source = self.message_source(Arc::clone(&metrics));
        Translator::new(self.language.clone())
            .with_metrics(metrics)
            .with_source("*", Arc::new(source))
    }
}

fn env_flag(name: &str, default: bool) -> Result<bool> {
    let Ok(value) = std::env::var(name) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{} must be a boolean, got '{}'", name, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 7] = [
        "I18N_BASE_PATH",
        "I18N_CATALOG",
        "I18N_USE_MO_FILE",
        "I18N_SOURCE_LANGUAGE",
        "I18N_LANGUAGE",
        "I18N_FORCE_TRANSLATION",
        "I18N_BIG_ENDIAN",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env().expect("Should succeed");

        assert_eq!(config.base_path, PathBuf::from("messages"));
        assert_eq!(config.catalog, "messages");
        assert!(config.use_mo_file);
        assert_eq!(config.source_language.code(), "en-US");
        assert_eq!(config.language, config.source_language);
        assert!(!config.force_translation);
        assert_eq!(config.endianness(), Endianness::Little);
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        std::env::set_var("I18N_BASE_PATH", "/srv/locale");
        std::env::set_var("I18N_CATALOG", "app");
        std::env::set_var("I18N_USE_MO_FILE", "false");
        std::env::set_var("I18N_LANGUAGE", "fa-IR");
        std::env::set_var("I18N_BIG_ENDIAN", "yes");

        let config = Config::from_env().expect("Should succeed");
        clear_env();

        assert_eq!(config.base_path, PathBuf::from("/srv/locale"));
        assert_eq!(config.catalog, "app");
        assert!(!config.use_mo_file);
        assert_eq!(config.language.code(), "fa-IR");
        assert_eq!(config.mo_file().endianness(), Endianness::Big);
        assert_eq!(
            config.message_source(Arc::new(LookupMetrics::new()))
                .message_file_path(&config.language),
            PathBuf::from("/srv/locale/fa-IR/app.po")
        );
    }

    #[test]
    #[serial]
    fn test_invalid_locale() {
        clear_env();
        std::env::set_var("I18N_LANGUAGE", "not a locale");
        let result = Config::from_env();
        clear_env();

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("I18N_LANGUAGE"));
    }

    #[test]
    #[serial]
    fn test_invalid_flag() {
        clear_env();
        std::env::set_var("I18N_FORCE_TRANSLATION", "maybe");
        let result = Config::from_env();
        clear_env();

        assert!(result.unwrap_err().to_string().contains("I18N_FORCE_TRANSLATION"));
    }
}
