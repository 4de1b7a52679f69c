//! Behavioral properties of compiled command trees

use arbor_compiler::Registrar;
use arbor_dispatch::{BasicSource, Dispatcher};
use arbor_foundation::ErrorKind;
use proptest::prelude::*;

use crate::{Handler, handler, player};

fn errors_of(data: &str) -> Vec<String> {
    match Registrar::new().compile(&handler(data)) {
        Ok(_) => Vec::new(),
        Err(err) => match err.kind {
            ErrorKind::Compilation { report, .. } => report
                .split("\n\n")
                .skip(1)
                .filter_map(|entry| entry.strip_prefix("Error: "))
                .map(|entry| entry.lines().next().unwrap_or_default().to_string())
                .collect(),
            other => vec![other.to_string()],
        },
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn greet_runs_the_handler_method() {
    let object = handler("name = 'greet'\nexecutes = run()");
    let mut dispatcher = Dispatcher::new();
    let node = Registrar::new().register(&object, &mut dispatcher).unwrap();
    assert_eq!(node.name(), "greet");
    assert!(node.children().is_empty());
    assert_eq!(dispatcher.execute("greet", player()).unwrap(), 1);
    assert_eq!(Handler::last(&object), 1);
}

#[test]
fn permission_requirement_on_an_argument() {
    let object = handler(
        "name = 'pick'\nargument('x', int(min=1, max=5)) { requires = permission('p')\nexecutes = set() }",
    );
    let compiled = Registrar::new().compile(&object).unwrap();
    let x = compiled.node.child("x").unwrap();
    assert_eq!(x.name(), "x");
    assert!(!x.can_use(&BasicSource::new("a")));
    assert!(x.can_use(&BasicSource::new("a").with_permission("p")));
}

#[test]
fn source_and_named_argument_method() {
    let object = handler("name = 'set'\nargument('n', int) = set()");
    let mut dispatcher = Dispatcher::new();
    Registrar::new().register(&object, &mut dispatcher).unwrap();
    assert_eq!(dispatcher.execute("set 42", player()).unwrap(), 42);
    assert_eq!(Handler::last(&object), 42);
}

#[test]
fn unknown_parameters_fail_without_stopping_siblings() {
    let data = "name = 'a'\n\
                literal('b') = set()\n\
                literal('c') = missing()";
    let errors = errors_of(data);
    assert!(errors.contains(&"Argument 'n' is not available in the current context".to_string()), "{errors:?}");
    assert!(errors.contains(&"No method named 'missing' found in TestHandler".to_string()), "{errors:?}");
}

// =============================================================================
// Variables
// =============================================================================

#[test]
fn variable_names_resolve_to_their_string() {
    let registrar = Registrar::new().with_variable("cmd", "teleport").unwrap();
    let compiled = registrar.compile(&handler("name = @cmd\nexecutes = run()")).unwrap();
    assert_eq!(compiled.node.name(), "teleport");
}

#[test]
fn unbound_variables_are_reported_once_at_their_position() {
    let data = "name = 'a'\nliteral(@missing) = run()";
    let err = Registrar::new().compile(&handler(data)).unwrap_err();
    let ErrorKind::Compilation { report, errors, .. } = err.kind else {
        panic!("expected a compilation error");
    };
    assert_eq!(errors, 1);
    assert_eq!(report.matches("Variable 'missing' not found").count(), 1);
    assert!(report.contains("literal(@missing) = run()\n        ^ Line 2 Column 9"), "{report}");
}

// =============================================================================
// Scoping
// =============================================================================

#[test]
fn arguments_are_visible_only_in_their_subtree() {
    let inside = "name = 'a'\nargument('n', int) { literal('go') = set() }";
    assert!(errors_of(inside).is_empty());

    let missing = "Argument 'n' is not available in the current context".to_string();
    let sibling = "name = 'a'\nargument('n', int) = run()\nliteral('other') = set()";
    assert!(errors_of(sibling).contains(&missing));

    let before = "name = 'a'\nliteral('first') = set()\nargument('n', int) = run()";
    assert!(errors_of(before).contains(&missing));
}

#[test]
fn duplicate_argument_names_in_scope_fail() {
    let data = "name = 'a'\nargument('n', int) { argument('n', word) = set() }";
    assert!(errors_of(data).contains(&"Duplicate argument name, n already declared".to_string()));

    let siblings = "name = 'a'\nargument('n', int) = set()\nliteral('x').argument('n', int) = set()";
    assert!(errors_of(siblings).is_empty());
}

proptest! {
    #[test]
    fn literal_names_compile_to_root_names(name in "[a-z][a-z0-9_]{0,12}") {
        let compiled = Registrar::new()
            .compile(&handler(&format!("name = '{name}'\nexecutes = run()")))
            .unwrap();
        prop_assert_eq!(compiled.node.name(), name.as_str());
        prop_assert!(compiled.node.children().is_empty());
    }
}
