//! Integration tests for parse error reporting

use arbor_language::{LineIndex, ParseOptions, format_error, parse};

#[test]
fn errors_point_at_the_offending_token() {
    let input = "name = 'a'\nliteral('b') {\n  executes = run()\n  executes = walk()\n}";
    let err = parse(input, &ParseOptions::default()).unwrap_err();
    assert_eq!(err.message(), "Tried to redefine 'executes' of node 'b'");
    let formatted = err.to_string();
    let lines: Vec<&str> = formatted.lines().collect();
    assert_eq!(lines[0], "Tried to redefine 'executes' of node 'b'");
    assert_eq!(lines[1], "executes = walk()");
    assert!(lines[2].contains("^ Line 4 Column "), "{formatted}");
}

#[test]
fn unknown_tokens() {
    let err = parse("name = 'a' %", &ParseOptions::default()).unwrap_err();
    assert_eq!(err.message(), "Unknown token '%'");
    assert_eq!(err.position(), Some(11));
}

#[test]
fn caret_layout() {
    assert_eq!(
        format_error("name greet", Some(5), "Expected assign, found identifier"),
        "Expected assign, found identifier\nname greet\n     ^ Line 1 Column 6"
    );
    assert_eq!(format_error("abc", None, "no position"), "no position");
}

#[test]
fn errors_convert_to_the_shared_error_type() {
    let err = parse("", &ParseOptions::default()).unwrap_err();
    let shared: arbor_foundation::Error = err.clone().into();
    assert!(matches!(shared.kind, arbor_foundation::ErrorKind::Parse { .. }));
    assert_eq!(shared.to_string(), err.formatted());
}

#[test]
fn line_index_is_one_based() {
    let source = "name = 'a'\nliteral('é') = run()";
    let index = LineIndex::new(source);
    assert_eq!(index.locate(source, 0), (1, 1));
    assert_eq!(index.locate(source, 11), (2, 1));
    let paren = source.find(") =").unwrap();
    assert_eq!(index.locate(source, paren), (2, 12));
}
