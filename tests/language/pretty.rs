//! Integration tests for the pretty-printer

use arbor_language::{ParseOptions, parse, pretty::pretty_print};
use proptest::prelude::*;

fn reprint(source: &str) -> String {
    let root = parse(source, &ParseOptions::default()).unwrap();
    pretty_print(&root)
}

#[test]
fn printed_documents_reparse_to_the_same_tree() {
    let source = r"
name = 'warp'
permission = @warp_perm
aliases = w
description = ['Warps', translatable('warp.help')]
argument('place', enum(values = @places)) {
  suggests = ['spawn', 'shop']
  map_result('place') = @lower
  requires = permission('warp.use')
  executes = warp()
  literal('silent') {
    label = 'quietly'
    executes = settings.warpSilently()
    transform = @hide
  }
}
";
    let once = reprint(source);
    assert_eq!(reprint(&once), once);
    assert!(once.contains("argument('place', enum(values = @places))"), "{once}");
}

#[test]
fn quotes_are_escaped() {
    let once = reprint(r"name = 'it\'s'");
    assert_eq!(once, "name = 'it\\'s'\n");
}

proptest! {
    #[test]
    fn generated_literal_trees_reprint_stably(
        names in prop::collection::vec("[a-z][a-z0-9_]{0,8}", 1..6),
        nested in any::<bool>(),
    ) {
        let mut source = String::from("name = 'root'\n");
        for name in &names {
            if nested {
                source.push_str(&format!("literal('{name}') {{ argument('n', int(min = 0)) = run() }}\n"));
            } else {
                source.push_str(&format!("literal('{name}') = run()\n"));
            }
        }
        let once = reprint(&source);
        prop_assert_eq!(reprint(&once), once);
    }
}
