//! Custom argument types and registrars shared between threads

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;

use arbor::compiler::{ClassBuilder, Object, Param, Registrar, TypeInfo, TypeRegistry, Variables};
use arbor::dispatch::{ArgumentTypeRef, BasicSource, Dispatcher, IntegerArgument};
use arbor::foundation::{ErrorKind, Type, Value};

#[derive(Default)]
struct Mixer {
    level: AtomicI64,
}

fn mixer(data: &str) -> (Object, Arc<Mixer>) {
    let class = ClassBuilder::<Mixer>::new("Mixer")
        .command_data(data)
        .method(
            "set",
            vec![Param::source(), Param::new("level", Type::Int)],
            Type::Int,
            |m, args| {
                let level = args.int(1)?;
                m.level.store(level, Ordering::SeqCst);
                Ok(Value::Int(level))
            },
        )
        .method(
            "pick",
            vec![Param::source(), Param::new("channel", Type::String)],
            Type::Int,
            |_, args| Ok(Value::Int(i64::try_from(args.string(1)?.len()).unwrap_or_default())),
        )
        .build();
    let state = Arc::new(Mixer::default());
    (Object::from_arc(class, Arc::clone(&state)), state)
}

fn percent_registry() -> Arc<TypeRegistry> {
    let registry = TypeRegistry::with_builtins();
    registry
        .register("percent", |_: &TypeInfo<'_>, _: &Variables| {
            Ok(ArgumentTypeRef::new(IntegerArgument::between(0, 100)))
        })
        .unwrap();
    Arc::new(registry)
}

fn player() -> arbor::dispatch::SharedSource {
    BasicSource::new("player").shared()
}

#[test]
fn owned_registries_add_types() {
    let registrar = Registrar::new().with_types(percent_registry());
    let (object, state) = mixer("name = 'volume'\nargument('level', percent) = set()");
    let mut dispatcher = Dispatcher::new();
    registrar.register(&object, &mut dispatcher).unwrap();

    assert_eq!(dispatcher.execute("volume 40", player()).unwrap(), 40);
    assert_eq!(state.level.load(Ordering::SeqCst), 40);
    assert!(dispatcher.execute("volume 140", player()).is_err());
}

#[test]
fn owned_types_stay_out_of_the_global_registry() {
    assert!(!TypeRegistry::global().contains("percent"));

    let (object, _) = mixer("name = 'volume'\nargument('level', percent) = set()");
    let err = Registrar::new().compile(&object).unwrap_err();
    match err.kind {
        ErrorKind::Compilation { report, errors, .. } => {
            assert!(errors >= 1);
            assert!(report.contains("Unknown argument type 'percent'"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn duplicate_types_are_rejected() {
    let registry = percent_registry();
    let err = registry
        .register("percent", |_: &TypeInfo<'_>, _: &Variables| {
            Ok(ArgumentTypeRef::new(IntegerArgument::new()))
        })
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateType(ref name) if name == "percent"));
}

#[test]
fn enum_choices_come_from_variables() {
    let registrar = Registrar::new()
        .with_variable("channels", vec!["music", "voice"])
        .unwrap();
    let (object, _) = mixer("name = 'mute'\nargument('channel', enum(values = @channels)) = pick()");
    let mut dispatcher = Dispatcher::new();
    registrar.register(&object, &mut dispatcher).unwrap();

    assert_eq!(dispatcher.execute("mute VOICE", player()).unwrap(), 5);
    assert!(dispatcher.execute("mute effects", player()).is_err());
    assert_eq!(dispatcher.suggestions("mute m", player()).texts(), vec!["music"]);
}

#[test]
fn registrars_compile_from_many_threads() {
    let registrar = Registrar::new().with_types(percent_registry());
    let names: Vec<String> = (0..8).map(|i| format!("volume{i}")).collect();

    let results: Vec<i32> = thread::scope(|scope| {
        let handles: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let registrar = &registrar;
                scope.spawn(move || {
                    let data = format!("name = '{name}'\nargument('level', percent) = set()");
                    let (object, _) = mixer(&data);
                    let mut dispatcher = Dispatcher::new();
                    registrar.register(&object, &mut dispatcher).unwrap();
                    dispatcher.execute(&format!("{name} {i}"), player()).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results, (0..8).collect::<Vec<_>>());
}
