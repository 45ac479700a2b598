//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! quoting system test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built rules, catalogs, clocks and services
//! - `builders`: Builder patterns for rules and requests
//! - `assertions`: Custom assertion helpers for quotes
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
