//! `minimum`, `maximum` (with their `exclusive*` modifiers) and
//! `multipleOf`. Bounds compare as `f64`; non-numeric instances pass here
//! and are reported by the `type` keyword instead.

use serde_json::Value;

use oasv_core::{CompileError, ValidationResults};

use crate::schema::Compiler;
use crate::validators::KeywordValidator;

/// Tolerance for `multipleOf` remainders, absorbing binary float noise like
/// `0.3 / 0.1`.
const MULTIPLE_OF_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

pub struct BoundValidator {
    bound: Bound,
    limit: f64,
    exclusive: bool,
}

impl BoundValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
        schema: &Value,
        bound: Bound,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let (keyword, modifier) = match bound {
            Bound::Min => ("minimum", "exclusiveMinimum"),
            Bound::Max => ("maximum", "exclusiveMaximum"),
        };
        let limit = keyword_value
            .as_f64()
            .ok_or_else(|| compiler.malformed(keyword, "bound must be a number"))?;
        let exclusive = schema.get(modifier).and_then(Value::as_bool).unwrap_or(false);
        Ok(Box::new(Self { bound, limit, exclusive }))
    }
}

impl KeywordValidator for BoundValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let Some(n) = instance.as_f64() else { return };
        let (violated, relation) = match (self.bound, self.exclusive) {
            (Bound::Min, false) => (n < self.limit, "below the minimum"),
            (Bound::Min, true) => (n <= self.limit, "at or below the exclusive minimum"),
            (Bound::Max, false) => (n > self.limit, "above the maximum"),
            (Bound::Max, true) => (n >= self.limit, "at or above the exclusive maximum"),
        };
        if violated {
            results.error(format!("value {n} is {relation} {}", self.limit));
        }
    }
}

pub struct MultipleOfValidator {
    factor: f64,
}

impl MultipleOfValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let factor = keyword_value
            .as_f64()
            .ok_or_else(|| compiler.malformed("multipleOf", "factor must be a number"))?;
        if factor <= 0.0 {
            return Err(compiler.malformed("multipleOf", "factor must be strictly positive"));
        }
        Ok(Box::new(Self { factor }))
    }
}

impl KeywordValidator for MultipleOfValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let Some(n) = instance.as_f64() else { return };
        let quotient = n / self.factor;
        if (quotient - quotient.round()).abs() > MULTIPLE_OF_EPSILON {
            results.error(format!("value {n} is not a multiple of {}", self.factor));
        }
    }
}
