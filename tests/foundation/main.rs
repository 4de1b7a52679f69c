//! Integration tests for the foundation layer
//!
//! Tests for the string reader, text rendering, values and errors.

mod errors;
mod reader;
mod values;
