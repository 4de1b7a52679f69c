//! Integration tests for the language layer
//!
//! Tests for parsing whole command documents, error reporting and the
//! pretty-printer.

mod documents;
mod errors;
mod pretty;
