//! Keyword registry behavior: replacing a built-in keyword, adding an `x-`
//! extension keyword, and the restrict-additional-properties option.

use std::sync::Arc;

use serde_json::{json, Value};

use oasv_core::{CompileError, Document, ValidationData, ValidationResults};
use oasv_schema::{
    Compiler, KeywordValidator, SchemaValidator, ValidationContext, ValidationOptions,
    ValidatorFactory,
};

/// A `maximum` replacement that accepts values up to `limit + tolerance`.
struct TolerantMaximum {
    limit: f64,
    tolerance: f64,
}

impl KeywordValidator for TolerantMaximum {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let Some(number) = instance.as_f64() else { return };
        if number > self.limit + self.tolerance {
            results.error(format!(
                "{number} exceeds the maximum {} even with tolerance {}",
                self.limit, self.tolerance
            ));
        }
    }
}

fn tolerant_maximum(tolerance: f64) -> ValidatorFactory {
    Arc::new(move |compiler: &Compiler<'_>, keyword_value: &Value, _schema: &Value| {
        let limit = keyword_value.as_f64().ok_or_else(|| CompileError::MalformedKeyword {
            keyword: "maximum".to_string(),
            schema: compiler.schema_name().to_string(),
            reason: "maximum must be a number".to_string(),
        })?;
        Ok(Box::new(TolerantMaximum { limit, tolerance }) as Box<dyn KeywordValidator>)
    })
}

/// Extension keyword `x-even`: when enabled, integer values must be even.
struct EvenValidator {
    enabled: bool,
}

impl KeywordValidator for EvenValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        if !self.enabled {
            return;
        }
        if let Some(number) = instance.as_i64() {
            if number % 2 != 0 {
                results.error(format!("{number} is not even"));
            }
        }
    }
}

fn even_keyword() -> ValidatorFactory {
    Arc::new(|_compiler: &Compiler<'_>, keyword_value: &Value, _schema: &Value| {
        Ok(Box::new(EvenValidator { enabled: keyword_value.as_bool().unwrap_or(false) })
            as Box<dyn KeywordValidator>)
    })
}

fn check(validator: &SchemaValidator, value: Value, expect_valid: bool) {
    let mut data: ValidationData = ValidationData::new();
    validator.validate(&value, &mut data);
    assert_eq!(data.is_valid(), expect_valid, "{value}: {}", data.results());
}

#[test]
fn test_override_replaces_builtin_maximum() {
    let schema = json!({"type": "number", "maximum": 100});
    let document = Arc::new(Document::new(schema.clone(), "mem://t"));
    let context = Arc::new(
        ValidationContext::new(document).with_validator("maximum", tolerant_maximum(5.0)),
    );
    let validator = SchemaValidator::new(context, "t", &schema).unwrap();

    check(&validator, json!(100), true);
    // The built-in would reject these two.
    check(&validator, json!(103), true);
    check(&validator, json!(105), true);
    check(&validator, json!(106), false);
}

#[test]
fn test_override_applies_through_references() {
    let root = json!({
        "components": {"schemas": {"Limited": {"type": "integer", "maximum": 10}}},
        "root": {"$ref": "#/components/schemas/Limited"}
    });
    let document = Arc::new(Document::new(root.clone(), "mem://t"));
    let context = Arc::new(
        ValidationContext::new(document).with_validator("maximum", tolerant_maximum(2.0)),
    );
    let validator = SchemaValidator::new(context, "root", &root["root"]).unwrap();

    check(&validator, json!(12), true);
    check(&validator, json!(13), false);
}

#[test]
fn test_extension_keyword_participates() {
    let schema = json!({"type": "integer", "x-even": true, "minimum": 0});
    let document = Arc::new(Document::new(schema.clone(), "mem://t"));
    let context =
        Arc::new(ValidationContext::new(document).with_validator("x-even", even_keyword()));
    let validator = SchemaValidator::new(context, "t", &schema).unwrap();

    check(&validator, json!(4), true);
    check(&validator, json!(3), false);
    // Built-in siblings still apply.
    check(&validator, json!(-2), false);
}

#[test]
fn test_unregistered_extension_keyword_is_inert() {
    let schema = json!({"type": "integer", "x-even": true});
    let document = Arc::new(Document::new(schema.clone(), "mem://t"));
    let validator = SchemaValidator::for_document(document, "t", &schema).unwrap();
    check(&validator, json!(3), true);
}

#[test]
fn test_restrict_option_forbids_undeclared_properties() {
    let schema = json!({
        "type": "object",
        "properties": {"name": {"type": "string"}}
    });
    let document = Arc::new(Document::new(schema.clone(), "mem://t"));

    let permissive =
        SchemaValidator::for_document(Arc::clone(&document), "t", &schema).unwrap();
    check(&permissive, json!({"name": "a", "extra": 1}), true);

    let context = Arc::new(ValidationContext::new(document).with_options(ValidationOptions {
        additional_properties_restrict: true,
    }));
    let strict = SchemaValidator::new(context, "t", &schema).unwrap();
    check(&strict, json!({"name": "a"}), true);
    check(&strict, json!({"name": "a", "extra": 1}), false);
}

#[test]
fn test_restrict_option_defers_to_explicit_policy() {
    let schema = json!({
        "type": "object",
        "properties": {"name": {"type": "string"}},
        "additionalProperties": true
    });
    let document = Arc::new(Document::new(schema.clone(), "mem://t"));
    let context = Arc::new(ValidationContext::new(document).with_options(ValidationOptions {
        additional_properties_restrict: true,
    }));
    let validator = SchemaValidator::new(context, "t", &schema).unwrap();
    check(&validator, json!({"name": "a", "extra": 1}), true);
}
