//! Member chains bound to handler fields and methods

use std::sync::Arc;

use arbor_compiler::{ClassBuilder, Object, Param, Registrar};
use arbor_dispatch::{
    ArgumentModifier, BasicSource, Command, CommandNode, Dispatcher, NodeBuilder, Requirement,
    Suggestions, Transformer,
};
use arbor_foundation::{Type, Value};

use crate::player;

struct Settings {
    limit: i64,
}

struct Plugin {
    settings: Arc<Settings>,
}

fn settings_class() -> Arc<arbor_compiler::Class> {
    ClassBuilder::<Settings>::new("Settings")
        .method("limit", vec![Param::source()], Type::Int, |s, _| Ok(Value::Int(s.limit)))
        .field("open", Type::Native("Requirement"), |_| {
            Value::native(Requirement::new(|s| s.has_permission("open")))
        })
        .build()
}

fn plugin(data: &str) -> Object {
    let class = ClassBuilder::<Plugin>::new("Plugin")
        .command_data(data)
        .object_field("settings", settings_class(), |p| {
            Object::from_arc(settings_class(), Arc::clone(&p.settings))
        })
        .field("ping", Type::Native("Command"), |_| Value::native(Command::new(|_| Ok(7))))
        .method("canUse", vec![Param::source()], Type::Bool, |_, args| {
            Ok(Value::Bool(args.source(0)?.has_permission("use")))
        })
        .method(
            "names",
            vec![Param::context(), Param::suggestions()],
            Type::Native("Suggestions"),
            |_, args| {
                let mut builder = args.suggestions(1)?;
                builder.suggest_matching("alpha").suggest_matching("beta");
                Ok(Value::native(builder.build()))
            },
        )
        .method("shout", vec![Param::new("value", Type::String)], Type::String, |_, args| {
            Ok(Value::from(args.string(0)?.to_uppercase()))
        })
        .method(
            "echo",
            vec![Param::source(), Param::new("word", Type::String)],
            Type::Int,
            |_, args| Ok(Value::Int(i64::try_from(args.string(1)?.len()).unwrap_or_default())),
        )
        .method(
            "maybe",
            vec![
                Param::source(),
                Param::new("count", Type::option(Type::Int)).optional_argument("count"),
            ],
            Type::Int,
            |_, args| Ok(Value::Int(args.value(1)?.as_int().unwrap_or(-1))),
        )
        .method("addHelp", vec![Param::node_builder()], Type::Nil, |_, args| {
            let mut help = NodeBuilder::literal("help");
            help.executes(Command::new(|_| Ok(99)));
            args.node_builder()?.then(help.build());
            Ok(Value::Nil)
        })
        .build();
    Object::new(
        class,
        Plugin {
            settings: Arc::new(Settings { limit: 20 }),
        },
    )
}

fn register(data: &str) -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    Registrar::new()
        .register(&plugin(data), &mut dispatcher)
        .unwrap();
    dispatcher
}

#[test]
fn chains_walk_object_fields() {
    let dispatcher = register("name = 'limit'\nexecutes = settings.limit()");
    assert_eq!(dispatcher.execute("limit", player()).unwrap(), 20);
}

#[test]
fn field_terminals_are_used_directly() {
    let dispatcher = register(
        "name = 'door'\nliteral('ping') = ping\nliteral('open') { requires = settings.open\nexecutes = ping }",
    );
    assert_eq!(dispatcher.execute("door ping", player()).unwrap(), 7);
    assert!(dispatcher.execute("door open", player()).is_err());
    let opener = BasicSource::new("o").with_permission("open").shared();
    assert_eq!(dispatcher.execute("door open", opener).unwrap(), 7);
}

#[test]
fn requirement_methods_take_the_source() {
    let dispatcher = register("name = 'use'\nrequires = canUse()\nexecutes = ping");
    assert!(dispatcher.execute("use", player()).is_err());
    assert_eq!(
        dispatcher.execute("use", BasicSource::new("u").with_permission("use").shared()).unwrap(),
        7
    );
}

#[test]
fn suggestion_methods_receive_the_builder() {
    let dispatcher = register("name = 'pick'\nargument('word', word) { suggests = names()\nexecutes = echo() }");
    let suggestions: Suggestions = dispatcher.suggestions("pick b", player());
    assert_eq!(suggestions.texts(), vec!["beta"]);
    assert_eq!(dispatcher.execute("pick hello", player()).unwrap(), 5);
}

#[test]
fn handler_mappers_rewrite_argument_values() {
    let mut dispatcher = Dispatcher::new();
    let length_of_upper = Command::new(|ctx| {
        let word = ctx.get_argument("word")?.as_str().unwrap_or_default();
        Ok(if word == "HEY" { 1 } else { 0 })
    });
    Registrar::new()
        .with_variable("check", Value::native(length_of_upper))
        .unwrap()
        .register(
            &plugin("name = 'say'\nargument('word', word) { map_result = shout()\nexecutes = @check }"),
            &mut dispatcher,
        )
        .unwrap();
    assert_eq!(dispatcher.execute("say hey", player()).unwrap(), 1);
}

#[test]
fn variable_mappers_chain_in_order() {
    let mut dispatcher = Dispatcher::new();
    let suffix = |tag: &'static str| {
        ArgumentModifier::new(move |_, value| {
            Ok(Value::from(format!("{}{tag}", value.as_str().unwrap_or_default())))
        })
    };
    let registrar = Registrar::new()
        .with_variable("a", Value::native(suffix("-a")))
        .unwrap()
        .with_variable("b", Value::native(suffix("-b")))
        .unwrap();
    registrar
        .register(
            &plugin("name = 'tag'\nargument('word', word) { map_result = @a\nmap_result = @b\nexecutes = echo() }"),
            &mut dispatcher,
        )
        .unwrap();
    // "x-a-b"
    assert_eq!(dispatcher.execute("tag x", player()).unwrap(), 5);
}

#[test]
fn optional_arguments_may_be_absent() {
    let dispatcher = register(
        "name = 'count'\nexecutes = maybe()\nargument('count', int) = maybe()",
    );
    assert_eq!(dispatcher.execute("count", player()).unwrap(), -1);
    assert_eq!(dispatcher.execute("count 4", player()).unwrap(), 4);
}

#[test]
fn transforms_edit_the_node_after_children() {
    let dispatcher = register("name = 'tool'\ntransform = addHelp()\nliteral('use') = ping");
    assert_eq!(dispatcher.execute("tool help", player()).unwrap(), 99);
    assert_eq!(dispatcher.execute("tool use", player()).unwrap(), 7);
}

#[test]
fn variable_transforms_and_requirements() {
    let mut dispatcher = Dispatcher::new();
    let hide = Transformer::new(|builder| {
        builder.requires(Requirement::new(|s| s.has_permission("staff")));
        Ok(())
    });
    let registrar = Registrar::new()
        .with_variable("hide", Value::native(hide))
        .unwrap();
    let node: Arc<CommandNode> = registrar
        .register(&plugin("name = 'secret'\ntransform = @hide\nexecutes = ping"), &mut dispatcher)
        .unwrap();
    assert!(!node.can_use(&BasicSource::new("a")));
    assert!(node.can_use(&BasicSource::new("a").with_permission("staff")));
}
