//! `items`, `minItems`, `maxItems` and `uniqueItems`. Non-array instances
//! pass here; the `type` keyword owns that complaint.

use serde_json::Value;

use oasv_core::{value, CompileError, ValidationResults};

use crate::schema::{Compiler, SchemaValidator};
use crate::validators::KeywordValidator;

pub struct ItemsValidator {
    inner: SchemaValidator,
}

impl ItemsValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        if keyword_value.is_array() {
            // Tuple-form items is a JSON-Schema draft feature outside the
            // OpenAPI profile.
            return Err(compiler.malformed("items", "items must be a single schema"));
        }
        Ok(Box::new(Self { inner: compiler.compile(keyword_value)? }))
    }
}

impl KeywordValidator for ItemsValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let Value::Array(items) = instance else { return };
        for (index, item) in items.iter().enumerate() {
            results.in_data_index(index, |r| self.inner.validate_into(item, r));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountBound {
    Min,
    Max,
}

pub struct ItemCountValidator {
    bound: CountBound,
    limit: u64,
}

impl ItemCountValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
        bound: CountBound,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let keyword = match bound {
            CountBound::Min => "minItems",
            CountBound::Max => "maxItems",
        };
        let limit = keyword_value
            .as_u64()
            .ok_or_else(|| compiler.malformed(keyword, "count must be a non-negative integer"))?;
        Ok(Box::new(Self { bound, limit }))
    }
}

impl KeywordValidator for ItemCountValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let Value::Array(items) = instance else { return };
        let count = items.len() as u64;
        match self.bound {
            CountBound::Min if count < self.limit => {
                results.error(format!("array has {count} items, fewer than the minimum {}", self.limit));
            }
            CountBound::Max if count > self.limit => {
                results.error(format!("array has {count} items, more than the maximum {}", self.limit));
            }
            _ => {}
        }
    }
}

pub struct UniqueItemsValidator {
    enabled: bool,
}

impl UniqueItemsValidator {
    pub(crate) fn build(keyword_value: &Value) -> Box<dyn KeywordValidator> {
        Box::new(Self { enabled: keyword_value.as_bool().unwrap_or(false) })
    }
}

impl KeywordValidator for UniqueItemsValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        if !self.enabled {
            return;
        }
        let Value::Array(items) = instance else { return };
        for j in 1..items.len() {
            if items[..j].iter().any(|earlier| value::json_eq(earlier, &items[j])) {
                results.in_data_index(j, |r| {
                    r.error("array items must be unique; duplicate found");
                });
            }
        }
    }
}
