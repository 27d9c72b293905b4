//! # Fatal Error Tier
//!
//! Errors that abort validator *construction*. Nothing in this module is
//! produced while validating an instance; contract violations travel through
//! [`crate::results::ValidationResults`] instead.

use thiserror::Error;

/// Fatal error raised while compiling a schema or operation validator.
#[derive(Error, Debug)]
pub enum CompileError {
    /// A `$ref` could not be resolved within the contract document.
    #[error("unresolved reference '{reference}' (from {location})")]
    UnresolvedReference {
        /// The reference string as written in the contract.
        reference: String,
        /// Diagnostic name of the schema being compiled when resolution failed.
        location: String,
    },

    /// A `$ref` chain re-entered a fragment that is still being compiled.
    #[error("reference cycle detected through '{reference}'")]
    ReferenceCycle {
        /// The fragment pointer that closed the cycle.
        reference: String,
    },

    /// A keyword value has a shape the vocabulary does not allow
    /// (e.g. a non-array `required`, a non-object `properties` entry).
    #[error("malformed '{keyword}' keyword in schema '{schema}': {reason}")]
    MalformedKeyword {
        /// The offending keyword name.
        keyword: String,
        /// Diagnostic name of the schema being compiled.
        schema: String,
        /// What was wrong with the keyword value.
        reason: String,
    },

    /// A `pattern`, `patternProperties` key, or path template did not
    /// compile as a regular expression.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern source text.
        pattern: String,
        /// The regex engine's rejection reason.
        reason: String,
    },

    /// The supplied validation context is bound to a different document
    /// than the schema being compiled.
    #[error("context/document mismatch: context is bound to '{context_base}', schema belongs to '{schema_base}'")]
    DocumentMismatch {
        /// Base URI of the context's document.
        context_base: String,
        /// Base URI of the schema's document.
        schema_base: String,
    },

    /// The contract source text could not be parsed into a value tree.
    #[error("cannot parse contract document: {reason}")]
    InvalidDocument {
        /// Parser rejection reason.
        reason: String,
    },

    /// A path item or operation node is structurally unusable
    /// (e.g. a parameter entry that is not an object).
    #[error("malformed operation definition: {reason}")]
    MalformedOperation {
        /// What was wrong with the definition.
        reason: String,
    },
}
