//! `type` keyword.

use serde_json::Value;

use oasv_core::{value, CompileError, ValidationResults};

use crate::schema::Compiler;
use crate::validators::KeywordValidator;

/// Declared instance type. The OpenAPI profile uses a single type name per
/// schema (no type arrays); `integer` accepts `1` and `1.0` alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpectedType {
    Boolean,
    Object,
    Array,
    Number,
    Integer,
    String,
}

pub struct TypeValidator {
    expected: ExpectedType,
}

impl TypeValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let name = keyword_value
            .as_str()
            .ok_or_else(|| compiler.malformed("type", "type must be a string"))?;
        let expected = match name {
            "boolean" => ExpectedType::Boolean,
            "object" => ExpectedType::Object,
            "array" => ExpectedType::Array,
            "number" => ExpectedType::Number,
            "integer" => ExpectedType::Integer,
            "string" => ExpectedType::String,
            other => {
                return Err(compiler.malformed("type", format!("unknown type '{other}'")));
            }
        };
        Ok(Box::new(Self { expected }))
    }
}

impl KeywordValidator for TypeValidator {
    fn validate(&self, value: &Value, results: &mut ValidationResults) {
        let matches = match self.expected {
            ExpectedType::Boolean => value.is_boolean(),
            ExpectedType::Object => value.is_object(),
            ExpectedType::Array => value.is_array(),
            ExpectedType::Number => value.is_number(),
            ExpectedType::Integer => value::is_integral(value),
            ExpectedType::String => value.is_string(),
        };
        if !matches {
            let expected = match self.expected {
                ExpectedType::Boolean => "boolean",
                ExpectedType::Object => "object",
                ExpectedType::Array => "array",
                ExpectedType::Number => "number",
                ExpectedType::Integer => "integer",
                ExpectedType::String => "string",
            };
            results.error(format!(
                "type expected '{expected}', found '{}'",
                value::type_name(value)
            ));
        }
    }
}
