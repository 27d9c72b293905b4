//! # Keyword Validators
//!
//! One small struct per keyword. Only keywords present in a definition are
//! instantiated; every instantiated validator is evaluated independently
//! against the same value so all simultaneous violations surface in one
//! pass. Nothing here short-circuits a sibling (the `$ref` exclusivity rule
//! lives in [`crate::schema`]).

use serde_json::Value;

use oasv_core::{CompileError, ValidationResults};

use crate::keyword::Keyword;
use crate::schema::Compiler;

pub mod array;
pub mod composition;
pub mod discriminator;
pub mod enums;
pub mod format;
pub mod numeric;
pub mod object;
pub mod string;
pub mod types;

/// An executable constraint for a single keyword.
///
/// Implementations append findings for violations; they never panic or
/// return errors at evaluation time.
pub trait KeywordValidator: Send + Sync {
    /// Check `value` and append any findings.
    fn validate(&self, value: &Value, results: &mut ValidationResults);
}

/// Instantiate the built-in validator for `keyword`, or `None` for keywords
/// consumed elsewhere (`$ref`, `nullable`, the exclusive-bound modifiers,
/// and `discriminator` when a composition sibling takes it over).
pub(crate) fn build(
    compiler: &Compiler<'_>,
    keyword: Keyword,
    keyword_value: &Value,
    schema: &Value,
) -> Result<Option<Box<dyn KeywordValidator>>, CompileError> {
    let built: Box<dyn KeywordValidator> = match keyword {
        // Handled at the node level in schema.rs.
        Keyword::Ref | Keyword::Nullable => return Ok(None),
        // Modifiers read by minimum / maximum.
        Keyword::ExclusiveMinimum | Keyword::ExclusiveMaximum => return Ok(None),

        Keyword::Type => types::TypeValidator::build(compiler, keyword_value)?,
        Keyword::Enum => enums::EnumValidator::build(compiler, keyword_value)?,
        Keyword::Const => enums::ConstValidator::build(keyword_value),

        Keyword::AllOf => composition::CompositionValidator::build(
            compiler,
            composition::CompositionKind::AllOf,
            keyword_value,
            schema,
        )?,
        Keyword::AnyOf => composition::CompositionValidator::build(
            compiler,
            composition::CompositionKind::AnyOf,
            keyword_value,
            schema,
        )?,
        Keyword::OneOf => composition::CompositionValidator::build(
            compiler,
            composition::CompositionKind::OneOf,
            keyword_value,
            schema,
        )?,
        Keyword::Not => composition::NotValidator::build(compiler, keyword_value)?,

        Keyword::Discriminator => {
            let has_composition = schema.get("allOf").is_some()
                || schema.get("anyOf").is_some()
                || schema.get("oneOf").is_some();
            if has_composition {
                // The composition validator owns the narrowing.
                return Ok(None);
            }
            discriminator::DiscriminatorValidator::build(compiler, keyword_value)?
        }

        Keyword::Properties => object::PropertiesValidator::build(compiler, keyword_value)?,
        Keyword::PatternProperties => {
            object::PatternPropertiesValidator::build(compiler, keyword_value)?
        }
        Keyword::AdditionalProperties => {
            object::AdditionalPropertiesValidator::build(compiler, keyword_value, schema)?
        }
        Keyword::Required => object::RequiredValidator::build(compiler, keyword_value)?,
        Keyword::MinProperties => {
            object::PropertyCountValidator::build(compiler, keyword_value, object::CountBound::Min)?
        }
        Keyword::MaxProperties => {
            object::PropertyCountValidator::build(compiler, keyword_value, object::CountBound::Max)?
        }
        Keyword::Dependencies => object::DependenciesValidator::build(compiler, keyword_value)?,

        Keyword::Items => array::ItemsValidator::build(compiler, keyword_value)?,
        Keyword::MinItems => {
            array::ItemCountValidator::build(compiler, keyword_value, array::CountBound::Min)?
        }
        Keyword::MaxItems => {
            array::ItemCountValidator::build(compiler, keyword_value, array::CountBound::Max)?
        }
        Keyword::UniqueItems => array::UniqueItemsValidator::build(keyword_value),

        Keyword::Minimum => {
            numeric::BoundValidator::build(compiler, keyword_value, schema, numeric::Bound::Min)?
        }
        Keyword::Maximum => {
            numeric::BoundValidator::build(compiler, keyword_value, schema, numeric::Bound::Max)?
        }
        Keyword::MultipleOf => numeric::MultipleOfValidator::build(compiler, keyword_value)?,

        Keyword::MinLength => {
            string::LengthValidator::build(compiler, keyword_value, string::CountBound::Min)?
        }
        Keyword::MaxLength => {
            string::LengthValidator::build(compiler, keyword_value, string::CountBound::Max)?
        }
        Keyword::Pattern => string::PatternValidator::build(compiler, keyword_value)?,
        Keyword::Format => format::FormatValidator::build(keyword_value),
    };
    Ok(Some(built))
}
