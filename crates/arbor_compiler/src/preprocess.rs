//! Textual `#directive(args)` substitution, run before lexing.
//!
//! `#paste(path)` is replaced by the text the loaders hold at `path`. No
//! other directive exists.

use std::sync::LazyLock;

use regex::Regex;

use crate::loader::Loaders;
use crate::result::{Failure, Resolved};

const DIRECTIVE_PATTERN: &str = r"#([a-zA-Z_$][a-zA-Z0-9_$]*)(?:\((.*)\))?";

static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DIRECTIVE_PATTERN).expect("directive pattern is valid"));

/// Expands every directive in `input`.
///
/// # Errors
/// Fails at the first unknown or malformed directive, or a paste whose path
/// no loader has.
pub fn preprocess(input: &str, loaders: &Loaders) -> Resolved<String> {
    let mut output = String::with_capacity(input.len());
    let mut last = 0;
    for captures in DIRECTIVE.captures_iter(input) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let directive = captures.get(1).map_or("", |m| m.as_str());
        let arguments = captures.get(2).map(|m| m.as_str());

        output.push_str(&input[last..whole.start()]);
        output.push_str(&expand(directive, arguments, whole.start(), loaders)?);
        last = whole.end();
    }
    output.push_str(&input[last..]);
    Ok(output)
}

fn expand(directive: &str, arguments: Option<&str>, start: usize, loaders: &Loaders) -> Resolved<String> {
    match directive {
        "paste" => match arguments {
            Some(path) if !path.is_empty() => loaders.find(path, start),
            _ => Err(Failure::at(
                start,
                "'paste' preprocessor requires filename to paste from",
            )),
        },
        other => Err(Failure::at(
            start,
            format!("Invalid preprocessor directive '{other}'"),
        )),
    }
}
