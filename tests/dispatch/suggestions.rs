//! Integration tests for `Dispatcher::suggestions`

use arbor_dispatch::{
    ArgumentTypeRef, BasicSource, Command, Dispatcher, EnumArgument, NodeBuilder, Requirement,
    StringArgument, SuggestionProvider,
};

fn dispatcher() -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register(
        NodeBuilder::literal("mode")
            .then(
                NodeBuilder::argument("value", ArgumentTypeRef::new(EnumArgument::new(["Survival", "Creative"])))
                    .executes(Command::new(|_| Ok(1)))
                    .build(),
            )
            .build(),
    );
    dispatcher.register(
        NodeBuilder::literal("warp")
            .then(
                NodeBuilder::argument("place", ArgumentTypeRef::new(StringArgument::word()))
                    .suggests(SuggestionProvider::strings(vec!["spawn".into(), "shop".into(), "arena".into()]))
                    .executes(Command::new(|_| Ok(1)))
                    .build(),
            )
            .then(
                NodeBuilder::literal("secret")
                    .requires(Requirement::new(|s| s.has_permission("warp.secret")))
                    .executes(Command::new(|_| Ok(2)))
                    .build(),
            )
            .build(),
    );
    dispatcher
}

#[test]
fn root_names_complete() {
    let suggestions = dispatcher().suggestions("w", BasicSource::new("a").shared());
    assert_eq!(suggestions.texts(), vec!["warp"]);
}

#[test]
fn providers_filter_by_prefix() {
    let suggestions = dispatcher().suggestions("warp s", BasicSource::new("a").shared());
    assert_eq!(suggestions.texts(), vec!["shop", "spawn"]);
}

#[test]
fn hidden_literals_are_not_suggested() {
    let dispatcher = dispatcher();
    let plain = dispatcher.suggestions("warp se", BasicSource::new("a").shared());
    assert!(plain.is_empty());
    let allowed = dispatcher.suggestions("warp se", BasicSource::new("a").with_permission("warp.secret").shared());
    assert_eq!(allowed.texts(), vec!["secret"]);
}

#[test]
fn enum_choices_complete_lowercase() {
    let suggestions = dispatcher().suggestions("mode c", BasicSource::new("a").shared());
    assert_eq!(suggestions.texts(), vec!["creative"]);
}
