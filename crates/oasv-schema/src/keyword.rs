//! # Built-in Keyword Vocabulary
//!
//! The closed set of schema keywords this engine understands. Free-form
//! extension keywords (`x-...`) are not enumerated here; they reach the
//! engine through the [`ValidationContext`](crate::ValidationContext)
//! registry escape hatch.

/// A built-in schema keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `$ref`, an exclusive reference to another schema definition.
    Ref,
    /// `type`
    Type,
    /// `nullable`, the explicit opt-in for null instances.
    Nullable,
    /// `enum`
    Enum,
    /// `const`, single-value equality.
    Const,
    /// `allOf`
    AllOf,
    /// `anyOf`
    AnyOf,
    /// `oneOf`
    OneOf,
    /// `not`
    Not,
    /// `discriminator`
    Discriminator,
    /// `properties`
    Properties,
    /// `patternProperties`
    PatternProperties,
    /// `additionalProperties`
    AdditionalProperties,
    /// `required`
    Required,
    /// `minProperties`
    MinProperties,
    /// `maxProperties`
    MaxProperties,
    /// `dependencies`
    Dependencies,
    /// `items`
    Items,
    /// `minItems`
    MinItems,
    /// `maxItems`
    MaxItems,
    /// `uniqueItems`
    UniqueItems,
    /// `minimum`
    Minimum,
    /// `maximum`
    Maximum,
    /// `exclusiveMinimum`, a modifier read by `minimum`.
    ExclusiveMinimum,
    /// `exclusiveMaximum`, a modifier read by `maximum`.
    ExclusiveMaximum,
    /// `multipleOf`
    MultipleOf,
    /// `minLength`
    MinLength,
    /// `maxLength`
    MaxLength,
    /// `pattern`
    Pattern,
    /// `format`
    Format,
}

impl Keyword {
    /// Look up a keyword by its spelled-out name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "$ref" => Keyword::Ref,
            "type" => Keyword::Type,
            "nullable" => Keyword::Nullable,
            "enum" => Keyword::Enum,
            "const" => Keyword::Const,
            "allOf" => Keyword::AllOf,
            "anyOf" => Keyword::AnyOf,
            "oneOf" => Keyword::OneOf,
            "not" => Keyword::Not,
            "discriminator" => Keyword::Discriminator,
            "properties" => Keyword::Properties,
            "patternProperties" => Keyword::PatternProperties,
            "additionalProperties" => Keyword::AdditionalProperties,
            "required" => Keyword::Required,
            "minProperties" => Keyword::MinProperties,
            "maxProperties" => Keyword::MaxProperties,
            "dependencies" => Keyword::Dependencies,
            "items" => Keyword::Items,
            "minItems" => Keyword::MinItems,
            "maxItems" => Keyword::MaxItems,
            "uniqueItems" => Keyword::UniqueItems,
            "minimum" => Keyword::Minimum,
            "maximum" => Keyword::Maximum,
            "exclusiveMinimum" => Keyword::ExclusiveMinimum,
            "exclusiveMaximum" => Keyword::ExclusiveMaximum,
            "multipleOf" => Keyword::MultipleOf,
            "minLength" => Keyword::MinLength,
            "maxLength" => Keyword::MaxLength,
            "pattern" => Keyword::Pattern,
            "format" => Keyword::Format,
            _ => return None,
        })
    }

    /// The keyword's spelled-out name, used in schema-side breadcrumbs.
    pub fn name(self) -> &'static str {
        match self {
            Keyword::Ref => "$ref",
            Keyword::Type => "type",
            Keyword::Nullable => "nullable",
            Keyword::Enum => "enum",
            Keyword::Const => "const",
            Keyword::AllOf => "allOf",
            Keyword::AnyOf => "anyOf",
            Keyword::OneOf => "oneOf",
            Keyword::Not => "not",
            Keyword::Discriminator => "discriminator",
            Keyword::Properties => "properties",
            Keyword::PatternProperties => "patternProperties",
            Keyword::AdditionalProperties => "additionalProperties",
            Keyword::Required => "required",
            Keyword::MinProperties => "minProperties",
            Keyword::MaxProperties => "maxProperties",
            Keyword::Dependencies => "dependencies",
            Keyword::Items => "items",
            Keyword::MinItems => "minItems",
            Keyword::MaxItems => "maxItems",
            Keyword::UniqueItems => "uniqueItems",
            Keyword::Minimum => "minimum",
            Keyword::Maximum => "maximum",
            Keyword::ExclusiveMinimum => "exclusiveMinimum",
            Keyword::ExclusiveMaximum => "exclusiveMaximum",
            Keyword::MultipleOf => "multipleOf",
            Keyword::MinLength => "minLength",
            Keyword::MaxLength => "maxLength",
            Keyword::Pattern => "pattern",
            Keyword::Format => "format",
        }
    }
}
