//! Composition keywords: `allOf`, `anyOf`, `oneOf` and `not`.
//!
//! Branches trial-evaluate into scratch accumulators so a passing
//! composition leaves no noise behind; failures absorb the branch findings
//! under the branch index. A sibling `discriminator` narrows `oneOf`/`anyOf`
//! evaluation to the single selected branch before the usual check.

use serde_json::Value;

use oasv_core::{CompileError, ValidationResults};

use crate::schema::{Compiler, SchemaValidator};
use crate::validators::discriminator::Discriminator;
use crate::validators::KeywordValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionKind {
    AllOf,
    AnyOf,
    OneOf,
}

impl CompositionKind {
    fn name(self) -> &'static str {
        match self {
            CompositionKind::AllOf => "allOf",
            CompositionKind::AnyOf => "anyOf",
            CompositionKind::OneOf => "oneOf",
        }
    }
}

/// One composition branch. `fragment`/`label` are set when the branch is a
/// plain `$ref`, enabling discriminator selection by mapping target or by
/// schema-name convention.
pub(crate) struct Branch {
    pub(crate) label: Option<String>,
    pub(crate) fragment: Option<String>,
    validator: SchemaValidator,
}

pub struct CompositionValidator {
    kind: CompositionKind,
    branches: Vec<Branch>,
    discriminator: Option<Discriminator>,
}

impl CompositionValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        kind: CompositionKind,
        keyword_value: &Value,
        schema: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let nodes = keyword_value.as_array().ok_or_else(|| {
            compiler.malformed(kind.name(), "composition keyword must be an array of schemas")
        })?;
        if nodes.is_empty() {
            return Err(compiler.malformed(kind.name(), "composition requires at least one schema"));
        }

        let mut branches = Vec::with_capacity(nodes.len());
        for node in nodes {
            let fragment = node
                .get("$ref")
                .and_then(Value::as_str)
                .map(|r| compiler.document().canonical_fragment(r));
            let label = fragment
                .as_deref()
                .and_then(|f| f.rsplit('/').next())
                .map(str::to_string);
            branches.push(Branch { label, fragment, validator: compiler.compile(node)? });
        }

        let discriminator = match schema.get("discriminator") {
            Some(node) => Some(Discriminator::parse(compiler, node)?),
            None => None,
        };

        Ok(Box::new(Self { kind, branches, discriminator }))
    }

    fn trial(&self, index: usize, instance: &Value) -> ValidationResults {
        let mut scratch = ValidationResults::new();
        self.branches[index].validator.validate_into(instance, &mut scratch);
        scratch
    }

    fn validate_all_of(&self, instance: &Value, results: &mut ValidationResults) {
        if let Some(discriminator) = &self.discriminator {
            // Inheritance style: the tag must be present; every branch still
            // applies, so there is nothing to narrow.
            discriminator.read_tag(instance, results);
        }
        for (index, branch) in self.branches.iter().enumerate() {
            results.in_schema_crumb(index.to_string(), |r| {
                branch.validator.validate_into(instance, r);
            });
        }
    }

    fn validate_narrowed(&self, instance: &Value, results: &mut ValidationResults) {
        let Some(discriminator) = &self.discriminator else { return };
        if let Some(index) = discriminator.select(instance, &self.branches, results) {
            results.in_schema_crumb(index.to_string(), |r| {
                self.branches[index].validator.validate_into(instance, r);
            });
        }
    }

    fn validate_any_of(&self, instance: &Value, results: &mut ValidationResults) {
        let mut failures = Vec::new();
        for index in 0..self.branches.len() {
            let scratch = self.trial(index, instance);
            if scratch.is_valid() {
                // At least one branch passes; no preference among several.
                return;
            }
            failures.push((index, scratch));
        }
        for (index, scratch) in failures {
            results.in_schema_crumb(index.to_string(), |r| r.absorb(scratch));
        }
        results.error(format!(
            "value does not match any of the {} anyOf schemas",
            self.branches.len()
        ));
    }

    fn validate_one_of(&self, instance: &Value, results: &mut ValidationResults) {
        let mut failures = Vec::new();
        let mut matched = 0usize;
        for index in 0..self.branches.len() {
            let scratch = self.trial(index, instance);
            if scratch.is_valid() {
                matched += 1;
            } else {
                failures.push((index, scratch));
            }
        }
        match matched {
            1 => {}
            0 => {
                for (index, scratch) in failures {
                    results.in_schema_crumb(index.to_string(), |r| r.absorb(scratch));
                }
                results.error(format!(
                    "value does not match any of the {} oneOf schemas",
                    self.branches.len()
                ));
            }
            n => {
                results.error(format!("value matches {n} oneOf schemas, exactly one expected"));
            }
        }
    }
}

impl KeywordValidator for CompositionValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        match self.kind {
            CompositionKind::AllOf => self.validate_all_of(instance, results),
            CompositionKind::AnyOf | CompositionKind::OneOf => {
                if self.discriminator.is_some() {
                    self.validate_narrowed(instance, results);
                } else if self.kind == CompositionKind::AnyOf {
                    self.validate_any_of(instance, results);
                } else {
                    self.validate_one_of(instance, results);
                }
            }
        }
    }
}

pub struct NotValidator {
    inner: SchemaValidator,
}

impl NotValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        Ok(Box::new(Self { inner: compiler.compile(keyword_value)? }))
    }
}

impl KeywordValidator for NotValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let mut scratch = ValidationResults::new();
        self.inner.validate_into(instance, &mut scratch);
        if scratch.is_valid() {
            results.error("value must not match the nested schema");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::SchemaValidator;
    use oasv_core::{Document, ValidationData};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn check(schema: Value, value: Value, expect_valid: bool) {
        let document = Arc::new(Document::new(schema.clone(), "mem://t"));
        let v = SchemaValidator::for_document(document, "t", &schema).unwrap();
        let mut data: ValidationData = ValidationData::new();
        v.validate(&value, &mut data);
        assert_eq!(data.is_valid(), expect_valid, "{value}: {}", data.results());
    }

    #[test]
    fn test_all_of_requires_every_branch() {
        let schema = json!({"allOf": [
            {"type": "integer"},
            {"minimum": 10}
        ]});
        check(schema.clone(), json!(12), true);
        check(schema.clone(), json!(5), false);
        check(schema, json!("12"), false);
    }

    #[test]
    fn test_any_of_requires_at_least_one() {
        let schema = json!({"anyOf": [
            {"type": "integer"},
            {"type": "string", "maxLength": 3}
        ]});
        check(schema.clone(), json!(7), true);
        check(schema.clone(), json!("ok"), true);
        check(schema.clone(), json!("too long"), false);
        check(schema, json!(true), false);
    }

    #[test]
    fn test_any_of_failure_reports_branch_findings() {
        let schema = json!({"anyOf": [{"type": "integer"}, {"type": "boolean"}]});
        let document = Arc::new(Document::new(schema.clone(), "mem://t"));
        let v = SchemaValidator::for_document(document, "t", &schema).unwrap();
        let mut data: ValidationData = ValidationData::new();
        v.validate(&json!("neither"), &mut data);
        assert!(!data.is_valid());
        // Two branch findings plus the summary.
        assert_eq!(data.results().len(), 3, "{}", data.results());
    }

    #[test]
    fn test_one_of_requires_exactly_one() {
        let schema = json!({"oneOf": [
            {"type": "number", "multipleOf": 5},
            {"type": "number", "multipleOf": 3}
        ]});
        check(schema.clone(), json!(10), true);
        check(schema.clone(), json!(9), true);
        // 15 matches both branches.
        check(schema.clone(), json!(15), false);
        // 2 matches neither.
        check(schema, json!(2), false);
    }

    #[test]
    fn test_not_inverts() {
        let schema = json!({"not": {"type": "integer"}});
        check(schema.clone(), json!("ok"), true);
        check(schema, json!(3), false);
    }

    #[test]
    fn test_one_of_discriminator_narrows() {
        let root = json!({
            "components": {"schemas": {
                "Cat": {
                    "type": "object",
                    "required": ["pet_type"],
                    "properties": {
                        "pet_type": {"type": "string"},
                        "age": {"type": "integer"}
                    }
                },
                "Dog": {
                    "type": "object",
                    "required": ["pet_type", "bark"],
                    "properties": {
                        "pet_type": {"type": "string"},
                        "bark": {"type": "boolean"},
                        "breed": {"type": "string", "enum": ["Dingo", "Husky", "Retriever"]}
                    }
                },
                "Pet": {
                    "oneOf": [
                        {"$ref": "#/components/schemas/Cat"},
                        {"$ref": "#/components/schemas/Dog"}
                    ],
                    "discriminator": {"propertyName": "pet_type"}
                }
            }}
        });
        let document = Arc::new(Document::new(root.clone(), "mem://t"));
        let schema = document.resolve("#/components/schemas/Pet", "t").unwrap().clone();
        let v = SchemaValidator::for_document(document, "Pet", &schema).unwrap();

        let cases = [
            (json!({"pet_type": "Cat", "age": 3}), true),
            (json!({"pet_type": "Dog", "bark": true}), true),
            (json!({"pet_type": "Dog", "bark": false, "breed": "Dingo"}), true),
            // No discriminator property at all.
            (json!({"age": 3}), false),
            // Selected branch rejects the nested breed value.
            (json!({"pet_type": "Dog", "bark": false, "breed": "foo"}), false),
            // Tag names no candidate.
            (json!({"pet_type": "Fish"}), false),
        ];
        for (value, expect_valid) in cases {
            let mut data: ValidationData = ValidationData::new();
            v.validate(&value, &mut data);
            assert_eq!(data.is_valid(), expect_valid, "{value}: {}", data.results());
        }
    }

    #[test]
    fn test_discriminator_mapping_selects_branch() {
        let root = json!({
            "components": {"schemas": {
                "Cat": {"type": "object", "properties": {"age": {"type": "integer"}}},
                "Dog": {"type": "object", "required": ["bark"],
                        "properties": {"bark": {"type": "boolean"}}},
                "Pet": {
                    "oneOf": [
                        {"$ref": "#/components/schemas/Cat"},
                        {"$ref": "#/components/schemas/Dog"}
                    ],
                    "discriminator": {
                        "propertyName": "kind",
                        "mapping": {"feline": "Cat", "canine": "#/components/schemas/Dog"}
                    }
                }
            }}
        });
        let document = Arc::new(Document::new(root.clone(), "mem://t"));
        let schema = document.resolve("#/components/schemas/Pet", "t").unwrap().clone();
        let v = SchemaValidator::for_document(document, "Pet", &schema).unwrap();

        let cases = [
            (json!({"kind": "feline", "age": 2}), true),
            (json!({"kind": "canine", "bark": true}), true),
            (json!({"kind": "canine"}), false),
            (json!({"kind": "reptile"}), false),
        ];
        for (value, expect_valid) in cases {
            let mut data: ValidationData = ValidationData::new();
            v.validate(&value, &mut data);
            assert_eq!(data.is_valid(), expect_valid, "{value}: {}", data.results());
        }
    }
}
