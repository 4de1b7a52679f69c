//! Integration tests for `StringReader`

use arbor_foundation::{StringReader, TranslationTable};

// =============================================================================
// Strings
// =============================================================================

#[test]
fn reads_words_then_quoted_strings() {
    let mut reader = StringReader::new("give \"diamond sword\" 'it\\'s'");
    assert_eq!(reader.read_string().unwrap(), "give");
    reader.skip_whitespace();
    assert_eq!(reader.read_string().unwrap(), "diamond sword");
    reader.skip_whitespace();
    assert_eq!(reader.read_string().unwrap(), "it's");
    assert!(!reader.can_read());
}

#[test]
fn unterminated_quote_reports_context() {
    let mut reader = StringReader::new("say \"hello");
    reader.read_unquoted_string();
    reader.skip_whitespace();
    let err = reader.read_string().unwrap_err();
    assert_eq!(err.cursor(), Some(10));
    assert_eq!(
        err.to_string(),
        "Unclosed quoted string at position 10: say \"hello<--[HERE]"
    );
}

#[test]
fn long_context_is_truncated() {
    let mut reader = StringReader::new("teleport somebody x");
    reader.set_cursor(18);
    let err = reader.read_int().map(|_| ()).unwrap_err();
    let context = err.context().unwrap();
    assert!(context.starts_with("..."));
    assert!(context.ends_with("somebody <--[HERE]"));
}

// =============================================================================
// Numbers
// =============================================================================

#[test]
fn numbers_parse_and_reset_on_failure() {
    let mut reader = StringReader::new("42 -7 1.5 1-2");
    assert_eq!(reader.read_int().unwrap(), 42);
    reader.skip_whitespace();
    assert_eq!(reader.read_long().unwrap(), -7);
    reader.skip_whitespace();
    assert!((reader.read_double().unwrap() - 1.5).abs() < f64::EPSILON);
    reader.skip_whitespace();

    let before = reader.cursor();
    let err = reader.read_int().unwrap_err();
    assert_eq!(reader.cursor(), before);
    assert_eq!(err.message().to_plain(), "Invalid integer '1-2'");
}

#[test]
fn booleans_are_exact_words() {
    let mut reader = StringReader::new("true yes");
    assert!(reader.read_bool().unwrap());
    reader.skip_whitespace();
    let err = reader.read_bool().unwrap_err();
    assert_eq!(err.cursor(), Some(5));
}

#[test]
fn translated_errors() {
    let mut reader = StringReader::new("");
    let err = reader.read_int().unwrap_err();
    let table = TranslationTable::new().with("parsing.int.expected", "Ganzzahl erwartet");
    assert!(err.render(&table).starts_with("Ganzzahl erwartet"));
}
