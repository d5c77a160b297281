//! ICU-style message formatter covering the subset that does not need a
//! full ICU engine.
//!
//! Supported argument types: plain `{name}`, `{n, number}`,
//! `{n, number, integer}`, `{g, select, ...}` and `{n, plural, ...}`
//! (with `offset:`, `=N`, `one`, `other` and `#`). Types that need locale
//! data (`date`, `time`, `spellout`, `ordinal`, `duration`, `choice`,
//! `selectordinal`) are reported as unsupported.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing argument | `{name}` but no `name` arg | Placeholder left as-is |
//! | Unbalanced braces | `{a` or `a}b{c}` | Failure sentinel, error code -1 |
//! | `select`/`plural` without choices | `{g, select}` | Failure sentinel, error code -1 |
//! | No matching choice | no selector and no `other` | Empty output for that span |
//! | ICU-only type | `{d, date}` | `FormatError::Unsupported` |

use super::args::{Args, Number, Value};
use thiserror::Error;

/// Error code reported after a successful format.
pub const ERROR_CODE_NONE: i32 = 0;

/// Error code reported for structurally invalid patterns.
pub const ERROR_CODE_INVALID_PATTERN: i32 = -1;

/// Errors raised while formatting a message pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Message pattern is invalid.")]
    InvalidPattern,

    #[error("Message format '{kind}' is not supported without full ICU support: {reason}")]
    Unsupported { kind: String, reason: String },
}

/// Argument type of a placeholder, resolved through `ARGUMENT_TYPES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgumentType {
    None,
    Number,
    Select,
    Plural,
    RequiresIcu,
}

const ARGUMENT_TYPES: &[(&str, ArgumentType)] = &[
    ("none", ArgumentType::None),
    ("number", ArgumentType::Number),
    ("select", ArgumentType::Select),
    ("plural", ArgumentType::Plural),
    ("date", ArgumentType::RequiresIcu),
    ("time", ArgumentType::RequiresIcu),
    ("spellout", ArgumentType::RequiresIcu),
    ("ordinal", ArgumentType::RequiresIcu),
    ("duration", ArgumentType::RequiresIcu),
    ("choice", ArgumentType::RequiresIcu),
    ("selectordinal", ArgumentType::RequiresIcu),
];

fn argument_type(name: &str) -> Option<ArgumentType> {
    ARGUMENT_TYPES
        .iter()
        .find(|(type_name, _)| *type_name == name)
        .map(|(_, kind)| *kind)
}

/// A piece of a tokenized pattern.
///
/// Tokenized patterns always alternate `Text, Placeholder, Text, ...` and
/// start and end with a (possibly empty) `Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Text(&'a str),
    /// Everything between the outermost braces, nested sub-patterns included.
    Placeholder(&'a str),
}

/// Split a pattern into text and top-level placeholders.
pub(crate) fn tokenize(pattern: &str) -> Result<Vec<Segment<'_>>, FormatError> {
    if !pattern.contains('{') {
        return Ok(vec![Segment::Text(pattern)]);
    }

    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    // braces are ASCII, so byte positions are always char boundaries
    for (pos, byte) in pattern.bytes().enumerate() {
        match byte {
            b'{' => {
                if depth == 0 {
                    segments.push(Segment::Text(&pattern[start..pos]));
                    start = pos + 1;
                }
                depth += 1;
            }
            b'}' => {
                depth = depth.checked_sub(1).ok_or(FormatError::InvalidPattern)?;
                if depth == 0 {
                    segments.push(Segment::Placeholder(&pattern[start..pos]));
                    start = pos + 1;
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(FormatError::InvalidPattern);
    }
    segments.push(Segment::Text(&pattern[start..]));
    Ok(segments)
}

/// Stateful formatter exposing the last error as a code/message pair.
///
/// # Example
///
/// ```
/// use i18n_kit::i18n::{args, MessageFormatter, Value};
///
/// let mut formatter = MessageFormatter::new();
/// let pattern = "{name} has {count, plural, one{one item} other{# items}}";
/// let params = args([("name", Value::from("A")), ("count", Value::from(5))]);
///
/// assert_eq!(
///     formatter.format(pattern, &params).unwrap(),
///     Some("A has 5 items".to_string())
/// );
/// assert_eq!(formatter.format("{unclosed", &params).unwrap(), None);
/// assert_eq!(formatter.error_code(), -1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageFormatter {
    error_code: i32,
    error_message: String,
}

impl MessageFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format `pattern` with `args`.
    ///
    /// Returns `Ok(None)` when the pattern is structurally invalid; the
    /// reason is then available from `error_code()` and `error_message()`.
    /// Argument types that need a full ICU engine are returned as
    /// `Err(FormatError::Unsupported)`.
    pub fn format(&mut self, pattern: &str, args: &Args) -> Result<Option<String>, FormatError> {
        self.error_code = ERROR_CODE_NONE;
        self.error_message.clear();

        match try_format(pattern, args) {
            Ok(formatted) => Ok(Some(formatted)),
            Err(FormatError::InvalidPattern) => {
                self.error_code = ERROR_CODE_INVALID_PATTERN;
                self.error_message = FormatError::InvalidPattern.to_string();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Code of the last failure (`0` after a successful call).
    pub fn error_code(&self) -> i32 {
        self.error_code
    }

    /// Message of the last failure (empty after a successful call).
    pub fn error_message(&self) -> &str {
        &self.error_message
    }
}

/// Format `pattern` with `args`, reporting every failure as an error.
pub fn try_format(pattern: &str, args: &Args) -> Result<String, FormatError> {
    let mut out = String::with_capacity(pattern.len());
    for segment in tokenize(pattern)? {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder(raw) => out.push_str(&format_placeholder(raw, args)?),
        }
    }
    Ok(out)
}

fn format_placeholder(raw: &str, args: &Args) -> Result<String, FormatError> {
    let mut parts = raw.splitn(3, ',');
    let name = parts.next().unwrap_or_default().trim();
    let Some(arg) = args.get(name) else {
        return Ok(format!("{{{raw}}}"));
    };

    let type_name = parts.next().map(str::trim).unwrap_or("none");
    let style = parts.next();

    match argument_type(type_name).ok_or(FormatError::InvalidPattern)? {
        ArgumentType::None => Ok(arg.to_string()),
        ArgumentType::Number => format_number(arg, style.map(str::trim)),
        ArgumentType::Select => select(style.ok_or(FormatError::InvalidPattern)?, arg, args),
        ArgumentType::Plural => plural(style.ok_or(FormatError::InvalidPattern)?, arg, args),
        ArgumentType::RequiresIcu => Err(FormatError::Unsupported {
            kind: type_name.to_string(),
            reason: "this argument type needs locale data".to_string(),
        }),
    }
}

/// `{n, number}` and `{n, number, integer}`.
fn format_number(arg: &Value, style: Option<&str>) -> Result<String, FormatError> {
    let unsupported = |reason: &str| FormatError::Unsupported {
        kind: "number".to_string(),
        reason: reason.to_string(),
    };
    let number = arg
        .as_number()
        .ok_or_else(|| unsupported("only numeric values can be formatted"))?;

    match (style, number) {
        (None, Number::Int(n)) | (Some("integer"), Number::Int(n)) => Ok(group_thousands(n)),
        (Some("integer"), Number::Float(f)) => {
            let rounded = f.round();
            Ok(group_float(rounded, &rounded.abs().to_string()))
        }
        (None, Number::Float(f)) => Ok(group_float(f, &f.abs().to_string())),
        (Some(other), _) => Err(unsupported(&format!("style '{other}' needs locale data"))),
    }
}

fn group_thousands(n: i64) -> String {
    let grouped = group_digits(&n.unsigned_abs().to_string());
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Group the integer part of `text` (the float's own unsigned decimal form).
fn group_float(f: f64, text: &str) -> String {
    let sign = if f < 0.0 { "-" } else { "" };
    match text.split_once('.') {
        Some((whole, decimals)) => format!("{sign}{}.{decimals}", group_digits(whole)),
        None => format!("{sign}{}", group_digits(text)),
    }
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `{g, select, male{..} female{..} other{..}}`.
///
/// A matching selector always wins; `other` only applies while nothing has
/// matched yet.
fn select(style: &str, arg: &Value, args: &Args) -> Result<String, FormatError> {
    let arg_text = arg.to_string();
    let mut message = None;

    for (selector, body) in choices(style)? {
        if (message.is_none() && selector == "other") || selector == arg_text {
            message = Some(body);
        }
    }

    match message {
        Some(body) => try_format(body, args),
        None => Ok(String::new()),
    }
}

/// `{n, plural, offset:1 =0{..} one{..} other{# ..}}`.
fn plural(style: &str, arg: &Value, args: &Args) -> Result<String, FormatError> {
    let number = arg.as_number().ok_or(FormatError::InvalidPattern)?;
    let mut offset = 0i64;
    let mut message: Option<String> = None;

    for (index, (selector, body)) in choices(style)?.into_iter().enumerate() {
        let mut selector = selector;
        if index == 0 {
            if let Some(rest) = selector.strip_prefix("offset:") {
                let (value, remainder) = rest
                    .trim_start()
                    .split_once(char::is_whitespace)
                    .unwrap_or((rest.trim(), ""));
                offset = value.parse().map_err(|_| FormatError::InvalidPattern)?;
                selector = remainder.trim();
            }
        }

        let value = number.minus(offset);
        let exact = selector
            .strip_prefix('=')
            .and_then(|k| k.trim().parse::<i64>().ok())
            .is_some_and(|k| *arg == Value::Int(k));

        if (message.is_none() && selector == "other") || exact || (selector == "one" && value.is_one())
        {
            message = Some(body.replace('#', &value.to_string()));
        }
    }

    match message {
        Some(body) => try_format(&body, args),
        None => Ok(String::new()),
    }
}

/// Split a `select`/`plural` style into trimmed `(selector, body)` pairs.
fn choices(style: &str) -> Result<Vec<(&str, &str)>, FormatError> {
    let segments = tokenize(style)?;
    let mut pairs = Vec::with_capacity(segments.len() / 2);

    for chunk in segments.chunks(2) {
        match chunk {
            [Segment::Text(selector), Segment::Placeholder(body)] => {
                pairs.push((selector.trim(), *body));
            }
            [Segment::Text(_)] => {}
            _ => return Err(FormatError::InvalidPattern),
        }
    }
    Ok(pairs)
}
