//! `minLength`, `maxLength` and `pattern`. Lengths count Unicode scalar
//! values, not bytes. Per the validation policy, `pattern` against a
//! non-string instance is its own type failure rather than a silent pass.

use regex::Regex;
use serde_json::Value;

use oasv_core::{value, CompileError, ValidationResults};

use crate::schema::Compiler;
use crate::validators::KeywordValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountBound {
    Min,
    Max,
}

pub struct LengthValidator {
    bound: CountBound,
    limit: u64,
}

impl LengthValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
        bound: CountBound,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let keyword = match bound {
            CountBound::Min => "minLength",
            CountBound::Max => "maxLength",
        };
        let limit = keyword_value
            .as_u64()
            .ok_or_else(|| compiler.malformed(keyword, "length must be a non-negative integer"))?;
        Ok(Box::new(Self { bound, limit }))
    }
}

impl KeywordValidator for LengthValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let Value::String(s) = instance else { return };
        let count = s.chars().count() as u64;
        match self.bound {
            CountBound::Min if count < self.limit => {
                results.error(format!(
                    "string length {count} is shorter than the minimum {}",
                    self.limit
                ));
            }
            CountBound::Max if count > self.limit => {
                results.error(format!(
                    "string length {count} is longer than the maximum {}",
                    self.limit
                ));
            }
            _ => {}
        }
    }
}

pub struct PatternValidator {
    source: String,
    regex: Regex,
}

impl PatternValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let source = keyword_value
            .as_str()
            .ok_or_else(|| compiler.malformed("pattern", "pattern must be a string"))?;
        let regex = Regex::new(source).map_err(|e| CompileError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Box::new(Self { source: source.to_string(), regex }))
    }
}

impl KeywordValidator for PatternValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        match instance {
            Value::String(s) => {
                if !self.regex.is_match(s) {
                    results.error(format!("string does not match pattern '{}'", self.source));
                }
            }
            other => results.error(format!(
                "pattern expects a string, found '{}'",
                value::type_name(other)
            )),
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
    fn test_length_bounds_count_chars() {
        let schema = json!({"minLength": 2, "maxLength": 4});
        check(schema.clone(), json!("ab"), true);
        check(schema.clone(), json!("abcd"), true);
        check(schema.clone(), json!("a"), false);
        check(schema.clone(), json!("abcde"), false);
        // Multi-byte characters count once each.
        check(schema.clone(), json!("héllo"), false);
        check(schema, json!("héll"), true);
    }

    #[test]
    fn test_pattern_match() {
        let schema = json!({"pattern": "^[0-9]{3}-[0-9]{2}$"});
        check(schema.clone(), json!("123-45"), true);
        check(schema.clone(), json!("123-456"), false);
        // Non-strings are a type failure for pattern, not a pass.
        check(schema, json!(12345), false);
    }

    #[test]
    fn test_invalid_pattern_is_fatal() {
        let schema = json!({"pattern": "(unclosed"});
        let document = Arc::new(Document::new(schema.clone(), "mem://t"));
        assert!(SchemaValidator::for_document(document, "t", &schema).is_err());
    }
}
