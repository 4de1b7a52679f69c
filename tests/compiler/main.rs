//! Integration tests for the compiler layer
//!
//! Tests for compiling handlers through `Registrar`: name and variable
//! resolution, argument scoping, member binding and diagnostics.

mod members;
mod properties;
mod reports;

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use arbor_compiler::{ClassBuilder, Object, Param};
use arbor_dispatch::{BasicSource, SharedSource};
use arbor_foundation::{Type, Value};

/// Records the last value a method was called with.
#[derive(Default)]
pub struct Handler {
    pub last: AtomicI64,
}

impl Handler {
    pub fn last(object: &Object) -> i64 {
        object
            .downcast_ref::<Handler>()
            .map_or(-1, |h| h.last.load(Ordering::SeqCst))
    }
}

/// A handler for `data` exposing `run(source)`, `set(source, n)`,
/// `isAdmin(source)` and a `title` field.
pub fn handler(data: &str) -> Object {
    let class = ClassBuilder::<Handler>::new("TestHandler")
        .command_data(data)
        .field("title", Type::String, |_| Value::from("titled"))
        .method("run", vec![Param::source()], Type::Int, |h, _| {
            h.last.store(1, Ordering::SeqCst);
            Ok(Value::Int(1))
        })
        .method(
            "set",
            vec![Param::source(), Param::new("n", Type::Int)],
            Type::Int,
            |h, args| {
                let n = args.int(1)?;
                h.last.store(n, Ordering::SeqCst);
                Ok(Value::Int(n))
            },
        )
        .method("isAdmin", vec![Param::source()], Type::Bool, |_, args| {
            Ok(Value::Bool(args.source(0)?.has_permission("admin")))
        })
        .build();
    Object::from_arc(class, Arc::new(Handler::default()))
}

pub fn player() -> SharedSource {
    BasicSource::new("player").shared()
}
