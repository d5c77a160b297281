//! Internationalization (i18n) module: message formatting and translation.
//!
//! # Architecture
//!
//! - `locale`: validated `Locale` type with base-language fallback
//! - `args`: typed message arguments
//! - `formatter`: ICU-style fallback `MessageFormatter`
//! - `translator`: `Translator` routing categories to message sources
//! - `validator`: placeholder consistency checks for translations
//! - `metrics`: lookup observability
//!
//! # Example
//!
//! ```
//! use i18n_kit::i18n::{args, try_format, Value};
//!
//! let params = args([("gender", Value::from("female")), ("name", Value::from("Ann"))]);
//! let text = try_format(
//!     "{gender, select, female{{name} wrote her post} other{{name} wrote a post}}",
//!     &params,
//! )
//! .unwrap();
//! assert_eq!(text, "Ann wrote her post");
//! ```

mod args;
mod formatter;
mod locale;
mod metrics;
mod translator;
mod validator;

pub use args::{args, Args, Value};
pub use formatter::{
    try_format, FormatError, MessageFormatter, ERROR_CODE_INVALID_PATTERN, ERROR_CODE_NONE,
};
pub use locale::Locale;
pub use metrics::{LookupMetrics, MetricsReport};
pub use translator::{TranslateError, Translator};
pub use validator::{PlaceholderValidator, ValidationReport};
