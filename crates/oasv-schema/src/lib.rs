//! # oasv-schema: Schema Validation Engine
//!
//! Compiles OpenAPI-profile schema definitions into executable validator
//! trees and evaluates arbitrary value trees against them.
//!
//! ## Model
//!
//! - A schema definition is a `serde_json::Value` interpreted under the
//!   fixed keyword vocabulary in [`keyword::Keyword`].
//! - [`SchemaValidator::new`] compiles the definition once, under a
//!   [`ValidationContext`] that carries the contract [`Document`], the
//!   option set, and any caller-supplied keyword overrides or extensions.
//! - [`SchemaValidator::validate`] appends findings to a
//!   `ValidationData` accumulator and never fails for semantic mismatches;
//!   the only fatal errors are construction-time (`CompileError`).
//!
//! ## Reference handling
//!
//! `$ref` is exclusive of sibling keywords. References resolve through the
//! document arena and compile through a context-wide registry: each distinct
//! fragment compiles exactly once, and an in-progress marker rejects
//! reference cycles deterministically at construction time.
//!
//! [`Document`]: oasv_core::Document

pub mod context;
pub mod keyword;
pub mod schema;
pub mod validators;

pub use context::{ValidationContext, ValidationOptions, ValidatorFactory};
pub use keyword::Keyword;
pub use schema::{Compiler, SchemaValidator};
pub use validators::KeywordValidator;
