//! Cross-layer integration tests for Arbor
//!
//! Tests that register realistic handlers end to end: loaders, custom
//! types, syntax listings and concurrent registration.

mod moderation;
mod registries;
