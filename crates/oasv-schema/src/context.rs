//! # Validation Context
//!
//! Per-document state shared by every validator compiled against one
//! contract: the document arena, the option set, the caller's keyword
//! registry (overrides of built-ins and free-form `x-` extensions), and the
//! compiled-fragment registry through which `$ref` and discriminator targets
//! compile exactly once.
//!
//! A context is configured before the first schema compiles against it and
//! never mutated afterwards; the fragment registry uses interior mutability
//! only for memoization.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use oasv_core::{CompileError, Document};

use crate::schema::{Compiler, SchemaValidator};
use crate::validators::KeywordValidator;

/// Factory producing a keyword validator from `(compiler, keyword value,
/// enclosing schema definition)`. Registered per keyword name on a
/// [`ValidationContext`]; replaces the built-in for that keyword or adds a
/// new extension keyword.
pub type ValidatorFactory = Arc<
    dyn Fn(&Compiler<'_>, &Value, &Value) -> Result<Box<dyn KeywordValidator>, CompileError>
        + Send
        + Sync,
>;

/// Global validation options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// Reject object properties that are neither declared in `properties`
    /// nor covered by `patternProperties` when the schema does not state an
    /// `additionalProperties` policy of its own. Off by default: the
    /// OpenAPI profile is permissive about extra properties.
    pub additional_properties_restrict: bool,
}

/// Per-document validation state.
///
/// ## Lifetime & Concurrency
///
/// One context spans all validator trees compiled against one document.
/// Configuration happens at construction; afterwards the context is safe to
/// share (`Arc<ValidationContext>`) across concurrent validations.
pub struct ValidationContext {
    document: Arc<Document>,
    options: ValidationOptions,
    overrides: HashMap<String, ValidatorFactory>,
    registry: Mutex<FragmentRegistry>,
}

#[derive(Default)]
struct FragmentRegistry {
    compiled: HashMap<String, Arc<SchemaValidator>>,
    in_progress: HashSet<String>,
}

impl ValidationContext {
    /// Context with default options and no keyword overrides.
    pub fn new(document: Arc<Document>) -> Self {
        Self {
            document,
            options: ValidationOptions::default(),
            overrides: HashMap::new(),
            registry: Mutex::new(FragmentRegistry::default()),
        }
    }

    /// Replace the option set.
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a keyword validator factory. An entry for a built-in
    /// keyword name replaces the built-in; any other name (conventionally
    /// `x-` prefixed) becomes a new extension keyword.
    pub fn with_validator(mut self, keyword: impl Into<String>, factory: ValidatorFactory) -> Self {
        self.overrides.insert(keyword.into(), factory);
        self
    }

    /// The contract document this context is bound to.
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// The effective option set.
    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    pub(crate) fn override_for(&self, keyword: &str) -> Option<ValidatorFactory> {
        self.overrides.get(keyword).cloned()
    }

    /// Compile the schema a fragment reference points at, memoized per
    /// canonical fragment. The in-progress marker makes a `$ref` chain that
    /// re-enters a fragment still being compiled fail deterministically
    /// instead of recursing.
    ///
    /// # Errors
    ///
    /// [`CompileError::UnresolvedReference`] if the fragment does not exist,
    /// [`CompileError::ReferenceCycle`] on re-entry, or any error from
    /// compiling the target schema.
    pub(crate) fn compiled_fragment(
        self: &Arc<Self>,
        reference: &str,
        location: &str,
    ) -> Result<Arc<SchemaValidator>, CompileError> {
        let key = self.document.canonical_fragment(reference);

        {
            let mut registry = self.lock_registry();
            if let Some(compiled) = registry.compiled.get(&key) {
                return Ok(Arc::clone(compiled));
            }
            if !registry.in_progress.insert(key.clone()) {
                return Err(CompileError::ReferenceCycle { reference: key });
            }
        }

        // Resolve and compile outside the lock: compiling the target may
        // recurse into other fragments.
        let compiled = self
            .document
            .resolve(reference, location)
            .and_then(|node| SchemaValidator::compile_with(self, &key, node));

        let mut registry = self.lock_registry();
        registry.in_progress.remove(&key);
        let compiled = Arc::new(compiled?);
        registry.compiled.insert(key, Arc::clone(&compiled));
        Ok(compiled)
    }

    fn lock_registry(&self) -> std::sync::MutexGuard<'_, FragmentRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationContext")
            .field("base_uri", &self.document.base_uri())
            .field("options", &self.options)
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compiled_fragment_is_memoized() {
        let document = Arc::new(Document::new(
            json!({"components": {"schemas": {"S": {"type": "string"}}}}),
            "mem://t",
        ));
        let ctx = Arc::new(ValidationContext::new(document));
        let a = ctx.compiled_fragment("#/components/schemas/S", "t").unwrap();
        let b = ctx.compiled_fragment("#/components/schemas/S", "t").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_reference_cycle_is_rejected() {
        let document = Arc::new(Document::new(
            json!({"components": {"schemas": {
                "A": {"$ref": "#/components/schemas/B"},
                "B": {"$ref": "#/components/schemas/A"}
            }}}),
            "mem://t",
        ));
        let ctx = Arc::new(ValidationContext::new(document));
        let err = ctx.compiled_fragment("#/components/schemas/A", "t").unwrap_err();
        assert!(matches!(err, CompileError::ReferenceCycle { .. }), "got: {err}");
    }

    #[test]
    fn test_unresolved_fragment_is_fatal() {
        let document = Arc::new(Document::new(json!({}), "mem://t"));
        let ctx = Arc::new(ValidationContext::new(document));
        let err = ctx.compiled_fragment("#/nowhere", "t").unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedReference { .. }), "got: {err}");
    }
}
