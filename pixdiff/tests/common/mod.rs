//! Common test utilities for pixdiff tests.
//!
//! Deterministic image generators so integration and property tests see
//! identical inputs on every platform.

pub mod generators;
