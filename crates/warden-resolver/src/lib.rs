//! Dependency graph validation for the Warden service manager.
//!
//! Builds the directed graph implied by each service record's declared
//! dependency ids, detects cycles, and computes deterministic topological
//! startup orders.

pub mod validator;

pub use validator::{DependencyValidator, ValidationIssue, ValidationReport};
