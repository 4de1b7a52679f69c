//! Integration tests for the dispatch layer
//!
//! Tests for building command trees by hand, executing them, suggestions
//! and permission checks.

mod execution;
mod suggestions;
