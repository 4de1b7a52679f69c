//! Integration tests for `Dispatcher::execute` and `Dispatcher::usage`

use arbor_dispatch::{
    ArgumentTypeRef, BasicSource, Command, Dispatcher, IntegerArgument, NodeBuilder, Requirement,
    StringArgument,
};

fn tree() -> Dispatcher {
    let amount = NodeBuilder::argument("amount", ArgumentTypeRef::new(IntegerArgument::between(1, 64)))
        .executes(Command::new(|ctx| {
            let n = ctx.get_argument("amount")?.as_int().unwrap_or_default();
            Ok(i32::try_from(n).unwrap_or(i32::MAX))
        }))
        .build();
    let target = NodeBuilder::argument("target", ArgumentTypeRef::new(StringArgument::word()))
        .executes(Command::new(|_| Ok(1)))
        .then(amount)
        .build();
    let admin = NodeBuilder::literal("reset")
        .requires(Requirement::new(|s| s.has_permission("admin")))
        .executes(Command::new(|_| Ok(99)))
        .build();

    let mut dispatcher = Dispatcher::new();
    dispatcher.register(
        NodeBuilder::literal("give")
            .alias("g")
            .then(target)
            .then(admin)
            .build(),
    );
    dispatcher
}

// =============================================================================
// Execution
// =============================================================================

#[test]
fn executes_deepest_match() {
    let dispatcher = tree();
    let source = BasicSource::new("steve").shared();
    assert_eq!(dispatcher.execute("give alex", source.clone()).unwrap(), 1);
    assert_eq!(dispatcher.execute("give alex 32", source).unwrap(), 32);
}

#[test]
fn aliases_share_the_tree() {
    let dispatcher = tree();
    assert_eq!(dispatcher.execute("g alex 5", BasicSource::new("a").shared()).unwrap(), 5);
    assert!(dispatcher.get("g").is_some());
}

#[test]
fn out_of_range_arguments_fail() {
    let dispatcher = tree();
    let err = dispatcher.execute("give alex 65", BasicSource::new("a").shared()).unwrap_err();
    assert!(err.to_string().contains("65"));
}

#[test]
fn non_executable_paths_fail() {
    let dispatcher = tree();
    assert!(dispatcher.execute("give", BasicSource::new("a").shared()).is_err());
    assert!(dispatcher.execute("take", BasicSource::new("a").shared()).is_err());
}

#[test]
fn requirements_hide_nodes() {
    let dispatcher = tree();
    assert!(dispatcher.execute("give reset", BasicSource::new("a").shared()).is_err());
    let admin = BasicSource::new("a").with_permission("admin").shared();
    assert_eq!(dispatcher.execute("give reset", admin).unwrap(), 99);
}

#[test]
fn permissions_gate_the_root() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register(
        NodeBuilder::literal("stop")
            .permission("server.stop")
            .executes(Command::new(|_| Ok(0)))
            .build(),
    );
    assert!(dispatcher.execute("stop", BasicSource::new("a").shared()).is_err());
    let op = BasicSource::operator("op").shared();
    assert_eq!(dispatcher.execute("stop", op).unwrap(), 0);
}

// =============================================================================
// Usage
// =============================================================================

#[test]
fn usage_lists_visible_paths() {
    let dispatcher = tree();
    let plain = BasicSource::new("a").shared();
    assert_eq!(
        dispatcher.usage("give", &plain),
        vec!["give <target>".to_string(), "give <target> <amount>".to_string()]
    );
    let admin = BasicSource::new("a").with_permission("admin").shared();
    assert_eq!(dispatcher.usage("give", &admin).len(), 3);
}
