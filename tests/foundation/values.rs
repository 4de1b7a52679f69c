//! Integration tests for `Value`, `Type` and `Text`

use arbor_foundation::{NativeType, Text, Type, Value};

#[test]
fn value_types() {
    assert_eq!(Value::Nil.value_type(), Type::Nil);
    assert_eq!(Value::from(3).value_type(), Type::Int);
    assert_eq!(Value::from("a").value_type(), Type::String);
    assert_eq!(Value::native(Text::plain("x")).value_type(), Text::native_type());
}

#[test]
fn natives_compare_by_identity() {
    let a = Value::native(Text::plain("same"));
    let b = Value::native(Text::plain("same"));
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
    assert_eq!(a.as_native::<Text>().unwrap().to_plain(), "same");
    assert!(a.as_native::<String>().is_none());
}

#[test]
fn optional_types_accept_nil() {
    let ty = Type::option(Type::String);
    assert!(ty.accepts(&Type::String));
    assert!(ty.accepts(&Type::Nil));
    assert!(!Type::String.accepts(&Type::Nil));
    assert_eq!(ty.to_string(), "string?");
}

#[test]
fn list_types_check_elements() {
    assert!(Type::list(Type::Any).accepts(&Type::list(Type::Int)));
    assert!(!Type::list(Type::Int).accepts(&Type::list(Type::String)));
}

#[test]
fn text_lines_and_keys() {
    let text = Text::lines([Text::plain("Bans a player"), Text::translatable("ban.help")]);
    assert_eq!(text.to_plain(), "Bans a player\nban.help");
    assert_eq!(Text::translatable("ban.help").key(), Some("ban.help"));
    assert_eq!(Text::plain("x").key(), None);
}
