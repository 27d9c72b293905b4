//! `enum` and `const` keywords. Equality uses JSON deep equality with
//! numeric widening, so `1` and `1.0` are the same member.

use serde_json::Value;

use oasv_core::{value, CompileError, ValidationResults};

use crate::schema::Compiler;
use crate::validators::KeywordValidator;

pub struct EnumValidator {
    allowed: Vec<Value>,
}

impl EnumValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let allowed = keyword_value
            .as_array()
            .ok_or_else(|| compiler.malformed("enum", "enum must be an array"))?
            .clone();
        Ok(Box::new(Self { allowed }))
    }
}

impl KeywordValidator for EnumValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        if !self.allowed.iter().any(|member| value::json_eq(member, instance)) {
            results.error(format!(
                "value is not one of the {} enumerated values",
                self.allowed.len()
            ));
        }
    }
}

pub struct ConstValidator {
    expected: Value,
}

impl ConstValidator {
    pub(crate) fn build(keyword_value: &Value) -> Box<dyn KeywordValidator> {
        Box::new(Self { expected: keyword_value.clone() })
    }
}

impl KeywordValidator for ConstValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        if !value::json_eq(&self.expected, instance) {
            results.error(format!("value must equal the constant {}", self.expected));
        }
    }
}
