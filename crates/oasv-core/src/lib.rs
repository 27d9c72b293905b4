//! # oasv-core: Foundational Types for the OASV Stack
//!
//! This crate is the bedrock of the OASV contract-validation stack. It holds
//! everything both validation engines (`oasv-schema`, `oasv-operation`) share
//! and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One value representation.** Schema definitions and instance data are
//!    both `serde_json::Value` trees. The `preserve_order` feature keeps
//!    object keys in declaration order, which matters for reporting and for
//!    `patternProperties` evaluation order.
//!
//! 2. **Two error tiers.** `CompileError` is raised while building a
//!    validator and aborts construction. Contract violations found while
//!    validating are never `Err`: they are appended to a
//!    [`ValidationResults`] accumulator and inspected through
//!    [`ValidationData::is_valid`].
//!
//! 3. **The document is an arena.** [`Document`] owns the parsed contract
//!    and resolves `#/...` fragment references through it. Validators never
//!    chase live object references, so reference cycles are detected at
//!    compile time instead of looping at evaluation time.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `oasv-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod results;
pub mod value;

pub use document::Document;
pub use error::CompileError;
pub use results::{
    DataCrumb, ValidationData, ValidationResult, ValidationResults, ValidationSeverity,
};
