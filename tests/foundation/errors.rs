//! Integration tests for `Error`
//!
//! Tests construction, display and conversion of error kinds.

use std::io;

use arbor_foundation::{Error, ErrorContext, ErrorKind, StringReader, Type};

// =============================================================================
// Display
// =============================================================================

#[test]
fn input_errors_name_the_handler() {
    let err = Error::new(ErrorKind::Input {
        command: "BanCommand".into(),
        message: "Empty input".into(),
    });
    assert_eq!(err.to_string(), "Error getting command input for BanCommand: Empty input");
}

#[test]
fn compilation_errors_show_the_report() {
    let err = Error::new(ErrorKind::Compilation {
        command: "ban".into(),
        report: "report text".into(),
        errors: 1,
        warnings: 0,
    });
    assert_eq!(err.to_string(), "report text");
}

#[test]
fn type_mismatch_names_both_types() {
    let err = Error::type_mismatch(Type::Int, Type::String);
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    assert_eq!(err.to_string(), "type mismatch: expected int, got string");
}

// =============================================================================
// Conversion
// =============================================================================

#[test]
fn syntax_errors_convert() {
    let syntax = StringReader::new("x").read_int().unwrap_err();
    let err: Error = syntax.into();
    assert!(err.as_syntax().is_some());
    assert!(err.to_string().starts_with("Expected integer"));
}

#[test]
fn io_errors_convert() {
    let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(err.kind, ErrorKind::Io(_)));
}

#[test]
fn context_is_attached() {
    let err = Error::execution("boom")
        .with_context(ErrorContext::new().with_command("ban").with_position(4).with_frame("executes"));
    let context = err.context.unwrap();
    assert_eq!(context.command.as_deref(), Some("ban"));
    assert_eq!(context.position, Some(4));
    assert_eq!(context.frames, vec!["executes".to_string()]);
}
