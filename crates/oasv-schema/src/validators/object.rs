//! Object-shape keywords: `properties`, `patternProperties`,
//! `additionalProperties`, `required`, `minProperties`, `maxProperties`
//! and `dependencies`. Non-object instances pass through all of them.

use regex::Regex;
use serde_json::Value;

use oasv_core::{CompileError, ValidationResults};

use crate::schema::{Compiler, SchemaValidator};
use crate::validators::KeywordValidator;

pub struct PropertiesValidator {
    properties: Vec<(String, SchemaValidator)>,
}

impl PropertiesValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let map = keyword_value
            .as_object()
            .ok_or_else(|| compiler.malformed("properties", "properties must be an object"))?;
        let mut properties = Vec::with_capacity(map.len());
        for (name, sub_schema) in map {
            properties.push((name.clone(), compiler.compile(sub_schema)?));
        }
        Ok(Box::new(Self { properties }))
    }
}

impl KeywordValidator for PropertiesValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let Value::Object(map) = instance else { return };
        for (name, sub) in &self.properties {
            if let Some(property_value) = map.get(name) {
                results.in_schema_crumb(name.clone(), |r| {
                    r.in_data_key(name.clone(), |r| sub.validate_into(property_value, r));
                });
            }
        }
    }
}

pub struct PatternPropertiesValidator {
    patterns: Vec<(String, Regex, SchemaValidator)>,
}

impl PatternPropertiesValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let map = keyword_value.as_object().ok_or_else(|| {
            compiler.malformed("patternProperties", "patternProperties must be an object")
        })?;
        let mut patterns = Vec::with_capacity(map.len());
        for (source, sub_schema) in map {
            let regex = Regex::new(source).map_err(|e| CompileError::InvalidPattern {
                pattern: source.clone(),
                reason: e.to_string(),
            })?;
            patterns.push((source.clone(), regex, compiler.compile(sub_schema)?));
        }
        Ok(Box::new(Self { patterns }))
    }
}

impl KeywordValidator for PatternPropertiesValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let Value::Object(map) = instance else { return };
        for (key, property_value) in map {
            for (source, regex, sub) in &self.patterns {
                if regex.is_match(key) {
                    results.in_schema_crumb(source.clone(), |r| {
                        r.in_data_key(key.clone(), |r| sub.validate_into(property_value, r));
                    });
                }
            }
        }
    }
}

enum AdditionalPolicy {
    /// `additionalProperties: true`, an explicit permissive statement.
    Allow,
    /// `additionalProperties: false`, or the restrict option.
    Forbid,
    /// `additionalProperties: {schema}`: undeclared properties validate
    /// against it.
    Schema(SchemaValidator),
}

pub struct AdditionalPropertiesValidator {
    policy: AdditionalPolicy,
    declared: Vec<String>,
    patterns: Vec<Regex>,
}

impl AdditionalPropertiesValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
        schema: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let policy = match keyword_value {
            Value::Bool(true) => AdditionalPolicy::Allow,
            Value::Bool(false) => AdditionalPolicy::Forbid,
            Value::Object(_) => AdditionalPolicy::Schema(compiler.compile(keyword_value)?),
            _ => {
                return Err(compiler.malformed(
                    "additionalProperties",
                    "additionalProperties must be a boolean or a schema",
                ))
            }
        };
        Self::with_policy(compiler, policy, schema)
    }

    /// Implicit `additionalProperties: false`, injected by the
    /// restrict-additional-properties context option.
    pub(crate) fn forbidding(
        compiler: &Compiler<'_>,
        schema: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        Self::with_policy(compiler, AdditionalPolicy::Forbid, schema)
    }

    fn with_policy(
        compiler: &Compiler<'_>,
        policy: AdditionalPolicy,
        schema: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let declared = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        let mut patterns = Vec::new();
        if let Some(map) = schema.get("patternProperties").and_then(Value::as_object) {
            for source in map.keys() {
                patterns.push(Regex::new(source).map_err(|e| CompileError::InvalidPattern {
                    pattern: source.clone(),
                    reason: e.to_string(),
                })?);
            }
        }
        Ok(Box::new(Self { policy, declared, patterns }))
    }

    fn is_declared(&self, key: &str) -> bool {
        self.declared.iter().any(|d| d == key) || self.patterns.iter().any(|p| p.is_match(key))
    }
}

impl KeywordValidator for AdditionalPropertiesValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let Value::Object(map) = instance else { return };
        for (key, property_value) in map {
            if self.is_declared(key) {
                continue;
            }
            match &self.policy {
                AdditionalPolicy::Allow => {}
                AdditionalPolicy::Forbid => {
                    results.in_data_key(key.clone(), |r| {
                        r.error(format!("additional property '{key}' is not allowed"));
                    });
                }
                AdditionalPolicy::Schema(sub) => {
                    results.in_data_key(key.clone(), |r| sub.validate_into(property_value, r));
                }
            }
        }
    }
}

pub struct RequiredValidator {
    keys: Vec<String>,
}

impl RequiredValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let entries = keyword_value
            .as_array()
            .ok_or_else(|| compiler.malformed("required", "required must be an array"))?;
        let mut keys = Vec::with_capacity(entries.len());
        for entry in entries {
            keys.push(
                entry
                    .as_str()
                    .ok_or_else(|| {
                        compiler.malformed("required", "required entries must be strings")
                    })?
                    .to_string(),
            );
        }
        Ok(Box::new(Self { keys }))
    }
}

impl KeywordValidator for RequiredValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let Value::Object(map) = instance else { return };
        for key in &self.keys {
            // Presence only: an invalid value is the property schema's report.
            if !map.contains_key(key) {
                results.error(format!("required property '{key}' is missing"));
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountBound {
    Min,
    Max,
}

pub struct PropertyCountValidator {
    bound: CountBound,
    limit: u64,
}

impl PropertyCountValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
        bound: CountBound,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let keyword = match bound {
            CountBound::Min => "minProperties",
            CountBound::Max => "maxProperties",
        };
        let limit = keyword_value
            .as_u64()
            .ok_or_else(|| compiler.malformed(keyword, "count must be a non-negative integer"))?;
        Ok(Box::new(Self { bound, limit }))
    }
}

impl KeywordValidator for PropertyCountValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let Value::Object(map) = instance else { return };
        let count = map.len() as u64;
        match self.bound {
            CountBound::Min if count < self.limit => {
                results.error(format!(
                    "object has {count} properties, fewer than the minimum {}",
                    self.limit
                ));
            }
            CountBound::Max if count > self.limit => {
                results.error(format!(
                    "object has {count} properties, more than the maximum {}",
                    self.limit
                ));
            }
            _ => {}
        }
    }
}

enum Dependency {
    Keys(Vec<String>),
    Schema(SchemaValidator),
}

pub struct DependenciesValidator {
    entries: Vec<(String, Dependency)>,
}

impl DependenciesValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let map = keyword_value
            .as_object()
            .ok_or_else(|| compiler.malformed("dependencies", "dependencies must be an object"))?;
        let mut entries = Vec::with_capacity(map.len());
        for (trigger, dependency) in map {
            let parsed = match dependency {
                Value::Array(keys) => {
                    let mut names = Vec::with_capacity(keys.len());
                    for key in keys {
                        names.push(
                            key.as_str()
                                .ok_or_else(|| {
                                    compiler.malformed(
                                        "dependencies",
                                        "property dependencies must be strings",
                                    )
                                })?
                                .to_string(),
                        );
                    }
                    Dependency::Keys(names)
                }
                Value::Object(_) | Value::Bool(_) => {
                    Dependency::Schema(compiler.compile(dependency)?)
                }
                _ => {
                    return Err(compiler.malformed(
                        "dependencies",
                        "each dependency must be an array of names or a schema",
                    ))
                }
            };
            entries.push((trigger.clone(), parsed));
        }
        Ok(Box::new(Self { entries }))
    }
}

impl KeywordValidator for DependenciesValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let Value::Object(map) = instance else { return };
        for (trigger, dependency) in &self.entries {
            if !map.contains_key(trigger) {
                continue;
            }
            match dependency {
                Dependency::Keys(names) => {
                    for name in names {
                        if !map.contains_key(name) {
                            results.error(format!(
                                "property '{name}' is required when '{trigger}' is present"
                            ));
                        }
                    }
                }
                Dependency::Schema(sub) => {
                    results.in_schema_crumb(trigger.clone(), |r| sub.validate_into(instance, r));
                }
            }
        }
    }
}
