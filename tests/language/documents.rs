//! Integration tests for parsing complete command documents

use arbor_language::{
    Description, Executes, MapperKind, Name, NodeKind, ParseOptions, Requires, Suggests, Transform,
    parse,
};

const BAN: &str = r"
name = 'ban'
permission = 'moderation.ban'
aliases = tempban | 'b'
description = ['Bans a player', translatable('ban.help')]

// who to ban
argument('target', word) {
  suggests = onlinePlayers()
  map_result = result.toLowerCase()
  executes = ban()

  argument('reason', greedy) {
    label = '[reason]'
    executes = banWithReason()
  }
}

/* quick form */
literal('self').literal('confirm') {
  requires = permission('moderation.ban.self')
  executes = @self_ban
  transform = addHelp()
}
";

fn parsed() -> arbor_language::Root {
    parse(BAN, &ParseOptions::default()).unwrap()
}

#[test]
fn header_fields() {
    let root = parsed();
    assert_eq!(root.body.name.text(), "ban");
    assert!(matches!(root.permission, Some(Name::Literal { ref value, .. }) if value == "moderation.ban"));
    assert_eq!(root.aliases.len(), 2);
    assert!(matches!(
        root.body.description,
        Some(Description::Array { ref elements, .. }) if elements.len() == 2
    ));
}

#[test]
fn argument_subtree() {
    let root = parsed();
    let target = &root.body.children[0];
    let NodeKind::Argument { ty, suggests } = &target.kind else {
        panic!("expected argument");
    };
    assert_eq!(ty.name(), "word");
    assert!(matches!(suggests, Some(Suggests::Member { chain, .. }) if chain.path() == "onlinePlayers()"));
    assert!(matches!(&target.body.mappers[0].kind, MapperKind::Result(chain) if chain.path() == "toLowerCase()"));
    assert!(target.body.mappers[0].target.is_none());

    let reason = &target.body.children[0];
    assert_eq!(reason.body.label.as_ref().map(Name::text), Some("[reason]"));
}

#[test]
fn chained_literals_nest() {
    let root = parsed();
    let this = &root.body.children[1];
    assert_eq!(this.body.name.text(), "self");
    let confirm = &this.body.children[0];
    assert!(matches!(confirm.body.requires, Some(Requires::Permission { .. })));
    assert!(matches!(confirm.body.executes, Some(Executes::Variable { ref name, .. }) if name == "self_ban"));
    assert!(matches!(confirm.body.transforms[..], [Transform::Member { .. }]));
    assert_eq!(root.node_count(), 5);
}
