//! Gettext PO text catalog codec.
//!
//! Plural entries are folded the way MO files store them: the key is
//! `singular\0plural` and the value joins every `msgstr[N]` with `\0`.
//! The header entry (`msgid ""`) is kept under the empty key.

use super::catalog::{join_key, split_key, MessageCatalog};
use super::CatalogError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// File-level access to PO catalogs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoFile;

impl PoFile {
    /// Load the translations of one context.
    pub fn load(
        &self,
        path: impl AsRef<Path>,
        context: &str,
    ) -> Result<HashMap<String, String>, CatalogError> {
        let messages = self.load_catalog(path)?.messages_for_context(context);
        Ok(messages)
    }

    /// Load every entry of a PO file.
    pub fn load_catalog(&self, path: impl AsRef<Path>) -> Result<MessageCatalog, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = parse_po(&content)?;
        debug!("Parsed {} entries from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Write `catalog` as a PO file.
    ///
    /// `language` fills the `Language:` header when the catalog carries no
    /// header entry of its own.
    pub fn save(
        &self,
        path: impl AsRef<Path>,
        catalog: &MessageCatalog,
        language: &str,
    ) -> Result<(), CatalogError> {
        let path = path.as_ref();
        fs::write(path, render_po(catalog, language)).map_err(|source| CatalogError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Wrote {} entries to {}", catalog.len(), path.display());
        Ok(())
    }
}

/// Which string an unprefixed continuation line extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    PluralId,
    Str(usize),
}

#[derive(Debug, Default)]
struct PendingEntry {
    context: Option<String>,
    id: Option<String>,
    plural_id: Option<String>,
    translations: Vec<(usize, String)>,
    first_line: usize,
}

impl PendingEntry {
    fn is_empty(&self) -> bool {
        self.context.is_none() && self.id.is_none()
    }

    fn field_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Context => self.context.as_mut(),
            Field::Id => self.id.as_mut(),
            Field::PluralId => self.plural_id.as_mut(),
            Field::Str(index) => self
                .translations
                .iter_mut()
                .find(|(i, _)| *i == index)
                .map(|(_, text)| text),
        }
    }

    /// Move a completed entry into the catalog.
    fn finish(&mut self, catalog: &mut MessageCatalog) -> Result<(), CatalogError> {
        let entry = std::mem::take(self);
        if entry.is_empty() {
            return Ok(());
        }

        let line = entry.first_line;
        let id = entry.id.ok_or_else(|| syntax(line, "msgctxt without msgid"))?;
        if entry.translations.is_empty() {
            return Err(syntax(line, "msgid without msgstr"));
        }

        let mut translations = entry.translations;
        translations.sort_by_key(|(index, _)| *index);
        if translations.iter().enumerate().any(|(expected, (index, _))| *index != expected) {
            return Err(syntax(line, "msgstr[N] indices must run from 0 without gaps or repeats"));
        }
        let value = translations
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join("\0");

        let key = match entry.plural_id {
            Some(plural) => format!("{id}\0{plural}"),
            None => id,
        };
        catalog.insert(join_key(entry.context.as_deref().unwrap_or(""), &key), value);
        Ok(())
    }
}

/// Parse PO text into a catalog.
pub fn parse_po(content: &str) -> Result<MessageCatalog, CatalogError> {
    let mut catalog = MessageCatalog::new();
    let mut entry = PendingEntry::default();
    let mut field: Option<Field> = None;

    for (index, raw_line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            entry.finish(&mut catalog)?;
            field = None;
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        if line.starts_with('"') {
            let text = unquote(line, line_no)?;
            let target = field
                .and_then(|f| entry.field_mut(f))
                .ok_or_else(|| syntax(line_no, "string without a preceding keyword"))?;
            target.push_str(&text);
            continue;
        }

        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| syntax(line_no, format!("expected a keyword and a string: {line}")))?;
        let text = unquote(rest.trim(), line_no)?;

        match keyword {
            "msgctxt" => {
                if entry.id.is_some() {
                    entry.finish(&mut catalog)?;
                }
                entry.first_line = line_no;
                entry.context = Some(text);
                field = Some(Field::Context);
            }
            "msgid" => {
                if entry.id.is_some() {
                    entry.finish(&mut catalog)?;
                }
                if entry.context.is_none() {
                    entry.first_line = line_no;
                }
                entry.id = Some(text);
                field = Some(Field::Id);
            }
            "msgid_plural" => {
                if entry.id.is_none() {
                    return Err(syntax(line_no, "msgid_plural before msgid"));
                }
                entry.plural_id = Some(text);
                field = Some(Field::PluralId);
            }
            "msgstr" => {
                if entry.id.is_none() {
                    return Err(syntax(line_no, "msgstr before msgid"));
                }
                entry.translations.push((0, text));
                field = Some(Field::Str(0));
            }
            other => {
                let plural_index = other
                    .strip_prefix("msgstr[")
                    .and_then(|s| s.strip_suffix(']'))
                    .and_then(|s| s.parse::<usize>().ok())
                    .ok_or_else(|| syntax(line_no, format!("unknown keyword '{other}'")))?;
                if entry.plural_id.is_none() {
                    return Err(syntax(line_no, "msgstr[N] without msgid_plural"));
                }
                entry.translations.push((plural_index, text));
                field = Some(Field::Str(plural_index));
            }
        }
    }

    entry.finish(&mut catalog)?;
    Ok(catalog)
}

/// Render a catalog as PO text.
pub fn render_po(catalog: &MessageCatalog, language: &str) -> String {
    let mut out = String::new();

    out.push_str("msgid \"\"\nmsgstr \"\"\n");
    match catalog.get("") {
        Some(header) => {
            for line in header.split_inclusive('\n') {
                out.push_str(&quote(line));
                out.push('\n');
            }
        }
        None => {
            for line in default_header(language) {
                out.push_str(&quote(&line));
                out.push('\n');
            }
        }
    }
    out.push('\n');

    for (raw, value) in catalog.iter().filter(|(raw, _)| !raw.is_empty()) {
        let (context, key) = split_key(raw);
        if let Some(context) = context {
            out.push_str(&format!("msgctxt {}\n", quote(context)));
        }
        match key.split_once('\0') {
            Some((singular, plural)) => {
                out.push_str(&format!("msgid {}\n", quote(singular)));
                out.push_str(&format!("msgid_plural {}\n", quote(plural)));
                for (index, form) in value.split('\0').enumerate() {
                    out.push_str(&format!("msgstr[{index}] {}\n", quote(form)));
                }
            }
            None => {
                out.push_str(&format!("msgid {}\n", quote(key)));
                out.push_str(&format!("msgstr {}\n", quote(value)));
            }
        }
        out.push('\n');
    }

    out
}

fn default_header(language: &str) -> Vec<String> {
    vec![
        "Project-Id-Version: \n".to_string(),
        "POT-Creation-Date: \n".to_string(),
        "PO-Revision-Date: \n".to_string(),
        "Last-Translator: \n".to_string(),
        "Language-Team: \n".to_string(),
        format!("Language: {}\n", language.replace('-', "_")),
        "MIME-Version: 1.0\n".to_string(),
        "Content-Type: text/plain; charset=UTF-8\n".to_string(),
        "Content-Transfer-Encoding: 8bit\n".to_string(),
    ]
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

fn unquote(text: &str, line: usize) -> Result<String, CatalogError> {
    let inner = text
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| syntax(line, format!("expected a quoted string: {text}")))?;

    let mut decoded = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => decoded.push('\n'),
            Some('r') => decoded.push('\r'),
            Some('t') => decoded.push('\t'),
            Some('"') => decoded.push('"'),
            Some('\\') => decoded.push('\\'),
            Some(other) => {
                decoded.push('\\');
                decoded.push(other);
            }
            None => return Err(syntax(line, "unterminated string")),
        }
    }
    Ok(decoded)
}

fn syntax(line: usize, message: impl Into<String>) -> CatalogError {
    CatalogError::PoSyntax {
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"# Translation file
msgid ""
msgstr ""
"Language: de\n"
"Content-Type: text/plain; charset=UTF-8\n"

#: templates/index.html:12
msgid "Hello"
msgstr "Hallo"

msgctxt "menu"
msgid "Open"
msgstr "Öffnen"

msgid ""
"A long "
"message"
msgstr "Eine lange "
"Nachricht"

msgid "Say \"hi\"\tnow"
msgstr "Sag \"hallo\"\njetzt"

msgid "{n} file"
msgid_plural "{n} files"
msgstr[0] "{n} Datei"
msgstr[1] "{n} Dateien"
"#;

    // ==================== Parser Tests ====================

    #[test]
    fn test_parse_simple_entry() {
        let catalog = parse_po(SAMPLE).expect("valid PO");
        assert_eq!(catalog.get("Hello"), Some("Hallo"));
    }

    #[test]
    fn test_parse_keeps_header_under_empty_key() {
        let catalog = parse_po(SAMPLE).expect("valid PO");
        let header = catalog.get("").expect("header entry");
        assert!(header.starts_with("Language: de\n"));
    }

    #[test]
    fn test_parse_context_entry() {
        let catalog = parse_po(SAMPLE).expect("valid PO");
        assert_eq!(catalog.get("menu\x04Open"), Some("Öffnen"));
        assert_eq!(catalog.get("Open"), None);
    }

    #[test]
    fn test_parse_continuation_lines() {
        let catalog = parse_po(SAMPLE).expect("valid PO");
        assert_eq!(catalog.get("A long message"), Some("Eine lange Nachricht"));
    }

    #[test]
    fn test_parse_escapes() {
        let catalog = parse_po(SAMPLE).expect("valid PO");
        assert_eq!(
            catalog.get("Say \"hi\"\tnow"),
            Some("Sag \"hallo\"\njetzt")
        );
    }

    #[test]
    fn test_parse_plural_entry() {
        let catalog = parse_po(SAMPLE).expect("valid PO");
        assert_eq!(
            catalog.get("{n} file\0{n} files"),
            Some("{n} Datei\0{n} Dateien")
        );
    }

    #[test]
    fn test_parse_entry_count() {
        let catalog = parse_po(SAMPLE).expect("valid PO");
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn test_parse_without_trailing_blank_line() {
        let catalog = parse_po("msgid \"a\"\nmsgstr \"b\"").expect("valid PO");
        assert_eq!(catalog.get("a"), Some("b"));
    }

    #[test]
    fn test_parse_adjacent_entries_without_blank_line() {
        let catalog =
            parse_po("msgid \"a\"\nmsgstr \"1\"\nmsgid \"b\"\nmsgstr \"2\"\n").expect("valid PO");
        assert_eq!(catalog.get("a"), Some("1"));
        assert_eq!(catalog.get("b"), Some("2"));
    }

    #[test]
    fn test_parse_missing_msgstr_is_error() {
        let result = parse_po("msgid \"a\"\n\nmsgid \"b\"\nmsgstr \"c\"\n");
        assert!(matches!(
            result,
            Err(CatalogError::PoSyntax { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_plural_index_gap_is_error() {
        let result = parse_po(
            "msgid \"file\"\nmsgid_plural \"files\"\nmsgstr[0] \"Datei\"\nmsgstr[2] \"Dateien\"\n",
        );
        assert!(matches!(result, Err(CatalogError::PoSyntax { line: 1, .. })));
    }

    #[test]
    fn test_parse_repeated_plural_index_is_error() {
        let result = parse_po(
            "msgid \"file\"\nmsgid_plural \"files\"\nmsgstr[0] \"Datei\"\nmsgstr[0] \"Dateien\"\n",
        );
        assert!(matches!(result, Err(CatalogError::PoSyntax { line: 1, .. })));
    }

    #[test]
    fn test_parse_unknown_keyword_is_error() {
        let result = parse_po("msgfoo \"a\"\n");
        match result {
            Err(CatalogError::PoSyntax { line, message }) => {
                assert_eq!(line, 1);
                assert!(message.contains("msgfoo"));
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_unquoted_string_is_error() {
        let result = parse_po("msgid hello\nmsgstr \"x\"\n");
        assert!(matches!(result, Err(CatalogError::PoSyntax { line: 1, .. })));
    }

    #[test]
    fn test_parse_orphan_continuation_is_error() {
        let result = parse_po("\"dangling\"\n");
        assert!(matches!(result, Err(CatalogError::PoSyntax { line: 1, .. })));
    }

    // ==================== Renderer Tests ====================

    #[test]
    fn test_render_generates_header_with_language() {
        let mut catalog = MessageCatalog::new();
        catalog.insert("Hello", "Hallo");
        let text = render_po(&catalog, "de-CH");

        assert!(text.starts_with("msgid \"\"\nmsgstr \"\"\n"));
        assert!(text.contains("\"Language: de_CH\\n\""));
        assert!(text.contains("msgid \"Hello\"\nmsgstr \"Hallo\"\n"));
    }

    #[test]
    fn test_render_writes_context_and_plural() {
        let mut catalog = MessageCatalog::new();
        catalog.insert_with_context("app", "{n} file\0{n} files", "{n} Datei\0{n} Dateien");
        let text = render_po(&catalog, "de");

        assert!(text.contains("msgctxt \"app\"\nmsgid \"{n} file\"\nmsgid_plural \"{n} files\"\n"));
        assert!(text.contains("msgstr[0] \"{n} Datei\"\nmsgstr[1] \"{n} Dateien\"\n"));
    }

    #[test]
    fn test_render_then_parse_preserves_entries() {
        let original = parse_po(SAMPLE).expect("valid PO");
        let reparsed = parse_po(&render_po(&original, "de")).expect("rendered PO parses");
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_render_escapes_backslash() {
        let mut catalog = MessageCatalog::new();
        catalog.insert("C:\\path", "C:\\Pfad");
        let text = render_po(&catalog, "de");
        assert!(text.contains("msgid \"C:\\\\path\""));
        assert_eq!(parse_po(&text).expect("parse").get("C:\\path"), Some("C:\\Pfad"));
    }

    // ==================== File Tests ====================

    #[test]
    fn test_save_and_load_context() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("messages.po");

        let mut catalog = MessageCatalog::new();
        catalog.insert_with_context("app", "Hello", "Hallo");
        catalog.insert("Hello", "Servus");
        PoFile.save(&path, &catalog, "de").expect("save");

        let app = PoFile.load(&path, "app").expect("load");
        assert_eq!(app.len(), 1);
        assert_eq!(app["Hello"], "Hallo");
    }

    #[test]
    fn test_load_missing_file_is_open_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = PoFile.load_catalog(temp_dir.path().join("missing.po"));
        assert!(matches!(result, Err(CatalogError::Open { .. })));
    }
}
