//! # Schema Compilation & Evaluation
//!
//! [`SchemaValidator`] is the compiled, executable form of a schema
//! definition: one node per definition, holding only the keyword validators
//! for keywords actually present. Compilation happens exactly once;
//! evaluation is synchronous, side-effect-only (findings are appended to the
//! accumulator) and safe to run concurrently against the same tree.

use std::sync::Arc;

use serde_json::Value;

use oasv_core::{CompileError, Document, ValidationData, ValidationResults};

use crate::context::ValidationContext;
use crate::keyword::Keyword;
use crate::validators::{self, KeywordValidator};

/// Handle passed to keyword-validator factories, giving them the compiling
/// schema's context and the ability to compile nested sub-schemas.
pub struct Compiler<'a> {
    context: &'a Arc<ValidationContext>,
    name: &'a str,
}

impl Compiler<'_> {
    /// The context the enclosing schema compiles under.
    pub fn context(&self) -> &Arc<ValidationContext> {
        self.context
    }

    /// The contract document.
    pub fn document(&self) -> &Arc<Document> {
        self.context.document()
    }

    /// Diagnostic name of the schema being compiled.
    pub fn schema_name(&self) -> &str {
        self.name
    }

    /// Compile a nested sub-schema under the same context.
    ///
    /// # Errors
    ///
    /// Any [`CompileError`] from the sub-schema.
    pub fn compile(&self, schema: &Value) -> Result<SchemaValidator, CompileError> {
        SchemaValidator::compile_with(self.context, self.name, schema)
    }

    pub(crate) fn malformed(&self, keyword: &str, reason: impl Into<String>) -> CompileError {
        CompileError::MalformedKeyword {
            keyword: keyword.to_string(),
            schema: self.name.to_string(),
            reason: reason.into(),
        }
    }
}

enum Node {
    /// Boolean schema `true`: accepts every value.
    AcceptAll,
    /// Boolean schema `false`: rejects every value.
    RejectAll,
    /// `$ref` definition; delegates entirely, sibling keywords ignored.
    Reference(Arc<SchemaValidator>),
    /// Ordinary definition: the keyword validators that were present.
    Keywords {
        validators: Vec<(String, Box<dyn KeywordValidator>)>,
        nullable: bool,
        has_type: bool,
    },
}

/// Compiled validator tree for one schema definition.
///
/// Immutable after construction; share with `Arc` for concurrent use.
pub struct SchemaValidator {
    name: String,
    context: Arc<ValidationContext>,
    node: Node,
}

impl SchemaValidator {
    /// Compile `schema` under an explicit context.
    ///
    /// # Errors
    ///
    /// Fatal construction errors only: unresolved references, reference
    /// cycles, malformed keyword values, invalid patterns. Any
    /// syntactically present keyword combination is otherwise accepted.
    pub fn new(
        context: Arc<ValidationContext>,
        name: impl Into<String>,
        schema: &Value,
    ) -> Result<Self, CompileError> {
        let name = name.into();
        tracing::debug!(schema = %name, base = %context.document().base_uri(), "compiling schema validator");
        Self::compile_with(&context, &name, schema)
    }

    /// Compile `schema` deriving a fresh default context from its document.
    ///
    /// # Errors
    ///
    /// Same as [`SchemaValidator::new`].
    pub fn for_document(
        document: Arc<Document>,
        name: impl Into<String>,
        schema: &Value,
    ) -> Result<Self, CompileError> {
        Self::new(Arc::new(ValidationContext::new(document)), name, schema)
    }

    pub(crate) fn compile_with(
        context: &Arc<ValidationContext>,
        name: &str,
        schema: &Value,
    ) -> Result<Self, CompileError> {
        let node = match schema {
            Value::Bool(true) => Node::AcceptAll,
            Value::Bool(false) => Node::RejectAll,
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref") {
                    let compiler = Compiler { context, name };
                    let reference = reference.as_str().ok_or_else(|| {
                        compiler.malformed("$ref", "reference must be a string")
                    })?;
                    Node::Reference(context.compiled_fragment(reference, name)?)
                } else {
                    let compiler = Compiler { context, name };
                    let mut compiled: Vec<(String, Box<dyn KeywordValidator>)> = Vec::new();

                    for (key, keyword_value) in map {
                        if let Some(factory) = context.override_for(key) {
                            compiled
                                .push((key.clone(), factory(&compiler, keyword_value, schema)?));
                            continue;
                        }
                        let Some(keyword) = Keyword::from_name(key) else {
                            // Annotations (title, description, example...) and
                            // unregistered extension keys carry no constraints.
                            continue;
                        };
                        if let Some(validator) =
                            validators::build(&compiler, keyword, keyword_value, schema)?
                        {
                            compiled.push((key.clone(), validator));
                        }
                    }

                    // The restrict option turns an absent additionalProperties
                    // into an implicit `false` for schemas that declare shape.
                    if context.options().additional_properties_restrict
                        && !map.contains_key("additionalProperties")
                        && (map.contains_key("properties")
                            || map.contains_key("patternProperties"))
                    {
                        compiled.push((
                            "additionalProperties".to_string(),
                            validators::object::AdditionalPropertiesValidator::forbidding(
                                &compiler, schema,
                            )?,
                        ));
                    }

                    Node::Keywords {
                        validators: compiled,
                        nullable: map.get("nullable").and_then(Value::as_bool).unwrap_or(false),
                        has_type: map.contains_key("type"),
                    }
                }
            }
            _ => {
                return Err(CompileError::MalformedKeyword {
                    keyword: "schema".to_string(),
                    schema: name.to_string(),
                    reason: "a schema definition must be an object or a boolean".to_string(),
                })
            }
        };

        Ok(Self { name: name.to_string(), context: Arc::clone(context), node })
    }

    /// Diagnostic name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The context this validator was compiled under.
    pub fn context(&self) -> &Arc<ValidationContext> {
        &self.context
    }

    /// Evaluate `value`, appending findings to `data`. Never fails for
    /// semantic mismatches.
    pub fn validate<T>(&self, value: &Value, data: &mut ValidationData<T>) {
        self.validate_into(value, data.results_mut());
    }

    /// Evaluate `value` against a bare results accumulator. Used by keyword
    /// validators recursing into sub-schemas.
    pub fn validate_into(&self, value: &Value, results: &mut ValidationResults) {
        match &self.node {
            Node::AcceptAll => {}
            Node::RejectAll => results.error("value rejected: schema is 'false'"),
            Node::Reference(target) => target.validate_into(value, results),
            Node::Keywords { validators, nullable, has_type } => {
                if value.is_null() {
                    // Null is an explicit opt-in: nullable true passes and
                    // short-circuits the siblings; otherwise a declared type
                    // rejects it. Without a type keyword, membership and
                    // composition still constrain null; shape keywords have
                    // nothing to say about it.
                    if *nullable {
                        return;
                    }
                    if *has_type {
                        results.in_schema_crumb("nullable", |r| {
                            r.error("null value is not allowed");
                        });
                        return;
                    }
                    for (keyword, validator) in validators {
                        if constrains_null(keyword) {
                            results.in_schema_crumb(keyword.clone(), |r| {
                                validator.validate(value, r);
                            });
                        }
                    }
                    return;
                }
                for (keyword, validator) in validators {
                    results.in_schema_crumb(keyword.clone(), |r| validator.validate(value, r));
                }
            }
        }
    }
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let node = match &self.node {
            Node::AcceptAll => "accept-all",
            Node::RejectAll => "reject-all",
            Node::Reference(_) => "reference",
            Node::Keywords { validators, .. } => {
                return f
                    .debug_struct("SchemaValidator")
                    .field("name", &self.name)
                    .field("keywords", &validators.iter().map(|(k, _)| k).collect::<Vec<_>>())
                    .finish();
            }
        };
        f.debug_struct("SchemaValidator").field("name", &self.name).field("node", &node).finish()
    }
}

/// Keywords that evaluate null when no `type` is declared.
fn constrains_null(keyword: &str) -> bool {
    matches!(keyword, "enum" | "const" | "allOf" | "anyOf" | "oneOf" | "not")
}
