//! Integration tests for i18n-kit
//!
//! These tests exercise the public API across modules: catalogs written to
//! disk and read back through the message source, translated and formatted
//! through the `Translator`, plus the calendar conversions.

use proptest::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use i18n_kit::calendar::{gregorian_to_jalali, jalali_to_gregorian, JalaliDate};
use i18n_kit::gettext::{
    join_key, read_header, read_messages, write_catalog, Endianness, GettextMessageSource,
    MessageCatalog, MessageSource, MoFile, PoFile, HEADER_SIZE,
};
use i18n_kit::i18n::{args, Locale, LookupMetrics, MessageFormatter, Translator, Value};

// ==================== Test Helpers ====================

fn locale(code: &str) -> Locale {
    Locale::parse(code).expect("valid locale")
}

fn encode(catalog: &MessageCatalog, endianness: Endianness) -> Vec<u8> {
    let mut bytes = Vec::new();
    write_catalog(&mut bytes, catalog, endianness).expect("Failed to encode catalog");
    bytes
}

fn decode(bytes: &[u8], context: &str) -> HashMap<String, String> {
    read_messages(&mut Cursor::new(bytes), context).expect("Failed to decode catalog")
}

fn write_po(dir: &Path, language: &str, content: &str) {
    let language_dir = dir.join(language);
    std::fs::create_dir_all(&language_dir).expect("Failed to create language dir");
    std::fs::write(language_dir.join("messages.po"), content).expect("Failed to write PO");
}

// ==================== MO Codec Tests ====================

#[test]
fn test_context_filtering() {
    let mut catalog = MessageCatalog::new();
    catalog.insert(join_key("ctxA", "hello"), "contextual");
    catalog.insert("hello", "plain");
    let bytes = encode(&catalog, Endianness::Little);

    let with_context = decode(&bytes, "ctxA");
    assert_eq!(with_context.len(), 1);
    assert_eq!(with_context["hello"], "contextual");

    let without_context = decode(&bytes, "");
    assert_eq!(without_context.len(), 1);
    assert_eq!(without_context["hello"], "plain");
}

#[test]
fn test_header_layout() {
    let mut catalog = MessageCatalog::new();
    catalog.insert("a", "b");
    catalog.insert("c", "d");

    for endianness in [Endianness::Little, Endianness::Big] {
        let bytes = encode(&catalog, endianness);
        assert_eq!(&bytes[..4], &endianness.magic());

        let header = read_header(&mut Cursor::new(&bytes)).expect("Should read header");
        assert_eq!(header.endianness, endianness);
        assert_eq!(header.count, 2);
        assert_eq!(header.source_table_offset, HEADER_SIZE);
        assert_eq!(header.target_table_offset, HEADER_SIZE + 16);
        assert_eq!(header.hash_table_size, 0);
        assert_eq!(header.hash_table_offset, HEADER_SIZE + 32);
    }
}

#[test]
fn test_mo_file_round_trip_on_disk() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("messages.mo");

    let mut catalog = MessageCatalog::new();
    catalog.insert_with_context("app", "Save", "Speichern");
    catalog.insert_with_context("admin", "Save", "Sichern");
    catalog.insert("Cancel", "Abbrechen");

    let mo_file = MoFile::new(Endianness::Big);
    mo_file.save(&path, &catalog).expect("Should write catalog");

    assert_eq!(
        MoFile::default().load_catalog(&path).expect("Should read catalog"),
        catalog
    );
    let admin = MoFile::default().load(&path, "admin").expect("Should read context");
    assert_eq!(admin.len(), 1);
    assert_eq!(admin["Save"], "Sichern");
}

fn entry_strategy() -> impl Strategy<Value = (String, String, String)> {
    (
        prop_oneof![Just(String::new()), "[a-z]{1,6}"],
        "[a-zA-Z0-9 {},.!?äöü]{1,20}",
        "[a-zA-Z0-9 {},.!?ßéè]{0,20}",
    )
}

proptest! {
    #[test]
    fn prop_round_trip_restricted_to_context(
        entries in proptest::collection::vec(entry_strategy(), 0..24),
        big_endian in any::<bool>(),
        context in prop_oneof![Just(String::new()), "[a-z]{1,6}"],
    ) {
        let catalog: MessageCatalog = entries
            .iter()
            .map(|(ctx, key, value)| (join_key(ctx, key), value.clone()))
            .collect();
        let endianness = if big_endian { Endianness::Big } else { Endianness::Little };

        let decoded = decode(&encode(&catalog, endianness), &context);
        let expected = catalog.messages_for_context(&context);
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn prop_endianness_does_not_change_content(
        entries in proptest::collection::vec(entry_strategy(), 0..16),
    ) {
        let catalog: MessageCatalog = entries
            .iter()
            .map(|(ctx, key, value)| (join_key(ctx, key), value.clone()))
            .collect();

        for context in catalog.contexts() {
            prop_assert_eq!(
                decode(&encode(&catalog, Endianness::Little), context),
                decode(&encode(&catalog, Endianness::Big), context)
            );
        }
    }
}

// ==================== PO -> MO Workflow Tests ====================

#[test]
fn test_po_compiled_to_mo_serves_same_translations() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let po_path = temp_dir.path().join("de.po");
    std::fs::write(
        &po_path,
        r#"msgid ""
msgstr ""
"Language: de\n"

msgctxt "app"
msgid "Hello, {name}!"
msgstr "Hallo, {name}!"

msgctxt "app"
msgid "{n, plural, one{# file} other{# files}}"
msgstr "{n, plural, one{# Datei} other{# Dateien}}"
"#,
    )
    .expect("Failed to write PO");

    let catalog = PoFile.load_catalog(&po_path).expect("Should parse PO");
    let language_dir = temp_dir.path().join("de");
    std::fs::create_dir_all(&language_dir).expect("Failed to create language dir");
    MoFile::default()
        .save(language_dir.join("messages.mo"), &catalog)
        .expect("Should write MO");

    let translator = Translator::new(locale("de")).with_source(
        "app",
        Arc::new(GettextMessageSource::new(temp_dir.path(), locale("en-US"))),
    );

    assert_eq!(
        translator
            .t("app", "Hello, {name}!", &args([("name", "Ann")]))
            .expect("Should translate"),
        "Hallo, Ann!"
    );
    assert_eq!(
        translator
            .t(
                "app",
                "{n, plural, one{# file} other{# files}}",
                &args([("n", 3)])
            )
            .expect("Should translate"),
        "3 Dateien"
    );
}

#[test]
fn test_decompiled_po_parses_back() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut catalog = MessageCatalog::new();
    catalog.insert_with_context("app", "Line\nbreak \"quoted\"", "Zeile\nUmbruch \"zitiert\"");
    catalog.insert("file\0files", "Datei\0Dateien");

    let po_path = temp_dir.path().join("out.po");
    PoFile.save(&po_path, &catalog, "de").expect("Should write PO");
    let reparsed = PoFile.load_catalog(&po_path).expect("Should parse PO");

    for (key, value) in catalog.iter() {
        assert_eq!(reparsed.get(key), Some(value));
    }
}

// ==================== Translation Tests ====================

#[test]
fn test_translator_fallback_chain() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_po(
        temp_dir.path(),
        "pt",
        "msgctxt \"app\"\nmsgid \"Save\"\nmsgstr \"Salvar\"\n\nmsgctxt \"app\"\nmsgid \"Open\"\nmsgstr \"Abrir\"\n",
    );
    write_po(
        temp_dir.path(),
        "pt-BR",
        "msgctxt \"app\"\nmsgid \"Save\"\nmsgstr \"Gravar\"\n",
    );

    let metrics = Arc::new(LookupMetrics::new());
    let source = GettextMessageSource::new(temp_dir.path(), locale("en-US"))
        .with_mo_file(false)
        .with_metrics(Arc::clone(&metrics));
    let translator = Translator::new(locale("pt-BR"))
        .with_metrics(Arc::clone(&metrics))
        .with_source("*", Arc::new(source));

    let none = args::<_, &str, Value>([]);
    assert_eq!(translator.t("app", "Save", &none).unwrap(), "Gravar");
    assert_eq!(translator.t("app", "Open", &none).unwrap(), "Abrir");
    assert_eq!(translator.t("app", "Close", &none).unwrap(), "Close");
    assert_eq!(
        translator
            .translate("app", "Save", &none, &locale("en-US"))
            .unwrap(),
        "Save"
    );

    let report = metrics.report();
    assert_eq!(report.catalog_loads, 2);
    assert_eq!(report.missing_translations, 1);
}

#[test]
fn test_message_source_is_shareable_across_threads() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_po(
        temp_dir.path(),
        "fr",
        "msgctxt \"app\"\nmsgid \"Hello\"\nmsgstr \"Bonjour\"\n",
    );
    let source: Arc<dyn MessageSource> = Arc::new(
        GettextMessageSource::new(temp_dir.path(), locale("en")).with_mo_file(false),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let source = Arc::clone(&source);
            std::thread::spawn(move || source.translate("app", "Hello", &locale("fr")))
        })
        .collect();

    for handle in handles {
        let translated = handle.join().expect("thread panicked").expect("Should translate");
        assert_eq!(translated.as_deref(), Some("Bonjour"));
    }
}

// ==================== Formatter Tests ====================

#[test]
fn test_formatter_reference_examples() {
    let mut formatter = MessageFormatter::new();
    let pattern = "{name} has {count, plural, one{one item} other{# items}}";

    let one = args([("name", Value::from("A")), ("count", Value::from(1))]);
    assert_eq!(
        formatter.format(pattern, &one).unwrap().as_deref(),
        Some("A has one item")
    );

    let five = args([("name", Value::from("A")), ("count", Value::from(5))]);
    assert_eq!(
        formatter.format(pattern, &five).unwrap().as_deref(),
        Some("A has 5 items")
    );

    let empty = args::<_, &str, Value>([]);
    assert_eq!(
        formatter.format("{missing} stays", &empty).unwrap().as_deref(),
        Some("{missing} stays")
    );

    assert_eq!(formatter.format("{unclosed", &empty).unwrap(), None);
    assert_eq!(formatter.error_code(), -1);
    assert_eq!(formatter.error_message(), "Message pattern is invalid.");
}

// ==================== Calendar Tests ====================

#[test]
fn test_reference_date_pair() {
    assert_eq!(gregorian_to_jalali(2013, 9, 13).unwrap(), (1392, 6, 22));
    assert_eq!(jalali_to_gregorian(1392, 6, 22).unwrap(), (2013, 9, 13));

    let date: JalaliDate = "1392/06/22".parse().unwrap();
    assert_eq!(date.to_gregorian().to_string(), "2013-09-13");
}

#[test]
fn test_every_jalali_day_of_a_cycle_round_trips() {
    for year in 1380..=1413 {
        for month in 1..=12 {
            let days = i18n_kit::calendar::days_in_month(year, month).unwrap();
            for day in 1..=days {
                let (gy, gm, gd) = jalali_to_gregorian(year, month, day).unwrap();
                assert_eq!(gregorian_to_jalali(gy, gm, gd).unwrap(), (year, month, day));
            }
        }
    }
}
