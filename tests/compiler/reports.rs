//! Inputs, registrar settings and the aggregated report

use std::fs;
use std::sync::Arc;

use arbor_compiler::{
    ClassBuilder, DirectoryLoader, MemoryLoader, Object, RegistrarOptions, Registrar, Severity,
    SyntaxCollector,
};
use arbor_dispatch::{BasicSource, Dispatcher};
use arbor_foundation::ErrorKind;

use crate::{handler, player};

// =============================================================================
// Inputs
// =============================================================================

#[test]
fn file_inputs_read_from_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("commands")).unwrap();
    fs::write(dir.path().join("commands/heal.cmd"), "name = 'heal'\nexecutes = run()").unwrap();
    fs::write(dir.path().join("commands/common.cmd"), "literal('self') = run()").unwrap();

    let registrar = Registrar::new().with_loader(DirectoryLoader::new(dir.path()));
    let compiled = registrar.compile(&handler("file = commands/heal.cmd")).unwrap();
    assert_eq!(compiled.node.name(), "heal");

    let pasted = registrar
        .compile(&handler("name = 'fix'\n#paste(commands/common.cmd)"))
        .unwrap();
    assert!(pasted.node.child("self").is_some());
}

#[test]
fn later_loaders_are_consulted_after_misses() {
    let registrar = Registrar::new()
        .with_loader(MemoryLoader::new())
        .with_loader(MemoryLoader::new().with("a.cmd", "name = 'a'\nexecutes = run()"));
    assert!(registrar.compile(&handler("file = a.cmd")).is_ok());
}

#[test]
fn input_errors_are_positioned() {
    let err = Registrar::new().compile(&handler("name = 'a'\n#paste()")).unwrap_err();
    let ErrorKind::Input { command, message } = err.kind else {
        panic!("expected an input error");
    };
    assert_eq!(command, "TestHandler");
    assert_eq!(
        message,
        "'paste' preprocessor requires filename to paste from\n#paste()\n^ Line 2 Column 1"
    );

    let err = Registrar::new().compile(&handler("name = 'a'\n#define(x)")).unwrap_err();
    assert!(err.to_string().contains("Invalid preprocessor directive 'define'"));
}

#[test]
fn parse_errors_abort_before_compiling() {
    let err = Registrar::new()
        .compile(&handler("name = 'a'\nexecutes = run()\nexecutes = run()"))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Parse { .. }));
    assert!(err.to_string().starts_with("Tried to redefine 'executes' of node 'a'"));
}

// =============================================================================
// Settings
// =============================================================================

#[test]
fn default_permission_applies_to_unpermissioned_roots() {
    let registrar = Registrar::new()
        .with_options(RegistrarOptions::default().with_default_permission("server.cmd.{command}"));
    let compiled = registrar.compile(&handler("name = 'home'\nexecutes = run()")).unwrap();
    assert_eq!(compiled.node.permission(), Some("server.cmd.home"));

    let explicit = registrar
        .compile(&handler("name = 'spawn'\npermission = 'spawn.{command}.use'\nexecutes = run()"))
        .unwrap();
    assert_eq!(explicit.node.permission(), Some("spawn.spawn.use"));
}

#[test]
fn default_executes_references_a_method() {
    let registrar = Registrar::new().with_options(RegistrarOptions::default().with_default_executes("run"));
    let mut dispatcher = Dispatcher::new();
    registrar.register(&handler("name = 'plain'"), &mut dispatcher).unwrap();
    assert_eq!(dispatcher.execute("plain", player()).unwrap(), 1);
}

#[test]
fn warnings_do_not_fail_unless_configured() {
    let data = "name = 'a'\nliteral('b') { map_result('ghost') = isAdmin()\nexecutes = run() }";
    let compiled = Registrar::new().compile(&handler(data)).unwrap();
    let warnings: Vec<_> = compiled
        .diagnostics
        .entries()
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(warnings, vec!["Argument 'ghost' doesn't exist in current scope"]);

    let strict = Registrar::new().with_options(RegistrarOptions::default().with_fail_on_warnings(true));
    let err = strict.compile(&handler(data)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Compilation { errors: 0, warnings: 1, .. }));
}

#[test]
fn mutable_name_fields_follow_the_configured_severity() {
    struct Named;
    let object = || {
        let class = ClassBuilder::<Named>::new("Named")
            .command_data("name = label\nexecutes = @noop")
            .mutable_field("label", arbor_foundation::Type::String, |_| "dynamic".into())
            .build();
        Object::new(class, Named)
    };
    let noop = arbor_foundation::Value::native(arbor_dispatch::Command::new(|_| Ok(0)));

    let lenient = Registrar::new().with_variable("noop", noop.clone()).unwrap();
    let compiled = lenient.compile(&object()).unwrap();
    assert_eq!(compiled.node.name(), "dynamic");
    assert_eq!(compiled.diagnostics.warning_count(), 1);

    let strict = lenient.with_options(
        RegistrarOptions::default().with_mutable_name_field_severity(Severity::Error),
    );
    assert!(strict.compile(&object()).is_err());
}

// =============================================================================
// Reports and syntax
// =============================================================================

#[test]
fn reports_list_every_diagnostic() {
    let data = "name = 'multi'\nliteral('a') = nope()\nliteral(@unset) = run()";
    let err = Registrar::new().compile(&handler(data)).unwrap_err();
    let report = err.to_string();
    assert!(report.starts_with(
        "Errors/Warnings during compilation of command 'multi' (2 total warnings/errors)"
    ), "{report}");
    assert!(report.contains("Error: No method named 'nope' found in TestHandler\nliteral('a') = nope()"));
    assert!(report.contains("Error: Variable 'unset' not found\nliteral(@unset) = run()"));
}

#[test]
fn syntax_entries_reach_the_sink() {
    let sink = Arc::new(SyntaxCollector::new());
    let registrar = Registrar::new().with_syntax_sink(sink.clone());
    let data = "name = 'mail'\n\
                description = 'Mail commands'\n\
                executes = run()\n\
                literal('read') { description = 'Reads mail'\nexecutes = run() }\n\
                literal('clear') {\n\
                  requires = isAdmin()\n\
                  argument('n', int) { label = 'count'\ndescription = 'Clears mail'\nexecutes = set() }\n\
                }";
    registrar.register(&handler(data), &mut Dispatcher::new()).unwrap();

    let lines: Vec<String> = sink.entries().iter().map(ToString::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "/mail - Mail commands",
            "/mail read - Reads mail",
            "/mail clear count - Clears mail",
        ]
    );
    assert_eq!(sink.help("mail", &BasicSource::new("a")).len(), 2);
    assert_eq!(sink.help("mail", &BasicSource::new("a").with_permission("admin")).len(), 3);
}
