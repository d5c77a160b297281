//! Locale type: validated language tag.
//!
//! Accepts tags such as `de`, `fil`, `de-CH`, `pt_BR` or `zh-Hans-CN`.
//! The primary subtag drives message-file fallback: `de-CH` falls back to `de`.

use anyhow::{bail, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

static LOCALE_REGEX: OnceLock<Regex> = OnceLock::new();

/// A validated locale identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Locale {
    code: String,
}

impl Locale {
    /// Parse and validate a locale code.
    ///
    /// # Example
    /// ```
    /// use i18n_kit::i18n::Locale;
    ///
    /// let swiss = Locale::parse("de-CH").unwrap();
    /// assert_eq!(swiss.language(), "de");
    /// assert!(swiss.is_regional());
    /// ```
    pub fn parse(code: &str) -> Result<Locale> {
        let regex = LOCALE_REGEX.get_or_init(|| {
            Regex::new(r"^[A-Za-z]{2,3}(?:[-_][A-Za-z0-9]{2,8})*$").expect("valid locale regex")
        });

        if code.is_empty() {
            bail!("Locale code must not be empty");
        }
        if !regex.is_match(code) {
            bail!("Invalid locale code: '{}'", code);
        }
        Ok(Locale {
            code: code.to_string(),
        })
    }

    /// The code as given (e.g. `"de-CH"`).
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The primary language subtag (e.g. `"de"` for `"de-CH"`).
    pub fn language(&self) -> &str {
        self.code
            .split(['-', '_'])
            .next()
            .unwrap_or(self.code.as_str())
    }

    /// Whether the locale carries a region or script subtag.
    pub fn is_regional(&self) -> bool {
        self.language().len() != self.code.len()
    }

    /// The locale reduced to its primary language subtag.
    pub fn base(&self) -> Locale {
        Locale {
            code: self.language().to_string(),
        }
    }

    /// The gettext spelling used in PO headers (`de_CH`).
    pub fn gettext_name(&self) -> String {
        self.code.replace('-', "_")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Locale::parse(s)
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.code
    }
}
