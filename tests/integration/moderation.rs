//! A moderation plugin registered from a command file

use std::fs;
use std::sync::{Arc, Mutex};

use arbor::compiler::{ClassBuilder, DirectoryLoader, Object, Param, Registrar, SyntaxCollector};
use arbor::dispatch::{BasicSource, Dispatcher};
use arbor::foundation::{Type, Value};

const BAN: &str = r"
name = 'ban'
permission = 'moderation.{command}'
aliases = tempban | b
description = 'Bans players'

argument('target', word) {
  suggests = onlinePlayers()
  map_result = normalize()
  description = 'Bans a player'
  executes = ban()

  argument('reason', greedy_string) {
    label = '[reason]'
    description = 'Bans a player with a reason'
    executes = banWithReason()
  }
}

#paste(shared/help.cmd)
";

const HELP: &str = "literal('help') { description = 'Shows help'\nexecutes = help() }";

#[derive(Default)]
struct Moderation {
    banned: Mutex<Vec<String>>,
}

impl Moderation {
    fn ban(&self, target: &str, reason: Option<&str>) -> i64 {
        let mut banned = self.banned.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        banned.push(match reason {
            Some(reason) => format!("{target}: {reason}"),
            None => target.to_string(),
        });
        i64::try_from(banned.len()).unwrap_or_default()
    }
}

fn moderation() -> (Object, Arc<Moderation>) {
    let class = ClassBuilder::<Moderation>::new("Moderation")
        .command_file("ban.cmd")
        .method(
            "onlinePlayers",
            vec![Param::suggestions()],
            Type::Native("Suggestions"),
            |_, args| {
                let mut builder = args.suggestions(0)?;
                for name in ["Alice", "alex", "Bob"] {
                    builder.suggest_matching(name);
                }
                Ok(Value::native(builder.build()))
            },
        )
        .method("normalize", vec![Param::new("name", Type::String)], Type::String, |_, args| {
            Ok(Value::from(args.string(0)?.to_lowercase()))
        })
        .method(
            "ban",
            vec![Param::source(), Param::new("target", Type::String)],
            Type::Int,
            |m, args| Ok(Value::Int(m.ban(args.string(1)?, None))),
        )
        .method(
            "banWithReason",
            vec![
                Param::source(),
                Param::new("target", Type::String),
                Param::new("reason", Type::String),
            ],
            Type::Int,
            |m, args| Ok(Value::Int(m.ban(args.string(1)?, Some(args.string(2)?)))),
        )
        .method("help", vec![Param::context()], Type::Nil, |_, _| Ok(Value::Nil))
        .build();
    let state = Arc::new(Moderation::default());
    (Object::from_arc(class, Arc::clone(&state)), state)
}

struct Fixture {
    _dir: tempfile::TempDir,
    dispatcher: Dispatcher,
    state: Arc<Moderation>,
    syntax: Arc<SyntaxCollector>,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("shared")).unwrap();
    fs::write(dir.path().join("ban.cmd"), BAN).unwrap();
    fs::write(dir.path().join("shared/help.cmd"), HELP).unwrap();

    let syntax = Arc::new(SyntaxCollector::new());
    let registrar = Registrar::new()
        .with_loader(DirectoryLoader::new(dir.path()))
        .with_syntax_sink(syntax.clone());

    let (object, state) = moderation();
    let mut dispatcher = Dispatcher::new();
    registrar.register(&object, &mut dispatcher).unwrap();
    Fixture {
        _dir: dir,
        dispatcher,
        state,
        syntax,
    }
}

fn moderator() -> arbor::dispatch::SharedSource {
    BasicSource::new("mod").with_permission("moderation.ban").shared()
}

#[test]
fn root_permission_is_required() {
    let fixture = fixture();
    assert!(fixture.dispatcher.execute("ban alice", BasicSource::new("guest").shared()).is_err());
    assert_eq!(fixture.dispatcher.execute("ban alice", moderator()).unwrap(), 1);
}

#[test]
fn mapped_arguments_reach_the_handler() {
    let fixture = fixture();
    fixture.dispatcher.execute("ban ALICE", moderator()).unwrap();
    fixture.dispatcher.execute("tempban Bob spamming the chat", moderator()).unwrap();
    fixture.dispatcher.execute("b carl", moderator()).unwrap();
    let banned = fixture.state.banned.lock().unwrap().clone();
    assert_eq!(banned, vec!["alice", "bob: spamming the chat", "carl"]);
}

#[test]
fn pasted_literals_are_part_of_the_tree() {
    let fixture = fixture();
    assert_eq!(fixture.dispatcher.execute("ban help", moderator()).unwrap(), 0);
}

#[test]
fn suggestions_come_from_the_handler() {
    let fixture = fixture();
    let suggestions = fixture.dispatcher.suggestions("ban al", moderator());
    assert_eq!(suggestions.texts(), vec!["alex", "Alice"]);
    assert!(fixture.dispatcher.suggestions("ban al", BasicSource::new("guest").shared()).is_empty());
}

#[test]
fn usage_listing() {
    let fixture = fixture();
    let lines: Vec<String> = fixture.syntax.entries().iter().map(ToString::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "/ban <target> - Bans a player",
            "/ban <target> [reason] - Bans a player with a reason",
            "/ban help - Shows help",
        ]
    );
    assert!(fixture.syntax.help("ban", &BasicSource::new("guest")).is_empty());
    let moderator = BasicSource::new("mod").with_permission("moderation.ban");
    assert_eq!(fixture.syntax.help("ban", &moderator).len(), 3);
}
