//! # Parameter Validation
//!
//! Path, query, header and cookie values arrive as raw strings; their
//! schemas speak typed values. A [`ParameterValidator`] bridges the two:
//! it coerces the raw string according to the schema's declared `type`
//! (strictly, so `"yes"` is not a boolean and `"1,2"` is not a number),
//! then runs the ordinary schema validator over the coerced value. The
//! coerced value is handed back through the [`ValidationData`] payload so
//! callers can reuse it without re-parsing.

use std::sync::Arc;

use serde_json::{Map, Number, Value};

use oasv_core::{CompileError, Document, ValidationData, ValidationResults};

use oasv_schema::{SchemaValidator, ValidationContext};

/// Where a parameter lives on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Path,
    Query,
    Header,
    Cookie,
}

impl Location {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "path" => Some(Location::Path),
            "query" => Some(Location::Query),
            "header" => Some(Location::Header),
            "cookie" => Some(Location::Cookie),
            _ => None,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Location::Path => "path",
            Location::Query => "query",
            Location::Header => "header",
            Location::Cookie => "cookie",
        })
    }
}

/// Compiled validator for one declared parameter.
///
/// `schema` holds the ref-resolved definition so coercion reads the same
/// `type` the compiled validator enforces.
pub struct ParameterValidator {
    name: String,
    location: Location,
    required: bool,
    explode: bool,
    schema: Option<Value>,
    validator: Option<SchemaValidator>,
}

impl ParameterValidator {
    /// Compile a (ref-resolved) parameter node.
    ///
    /// # Errors
    ///
    /// [`CompileError::MalformedOperation`] when `name` or `in` is missing
    /// or unusable, plus any schema compilation error.
    pub fn new(context: &Arc<ValidationContext>, node: &Value) -> Result<Self, CompileError> {
        let name = node
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| CompileError::MalformedOperation {
                reason: "parameter requires a string 'name'".to_string(),
            })?
            .to_string();
        let location = node
            .get("in")
            .and_then(Value::as_str)
            .and_then(Location::from_name)
            .ok_or_else(|| CompileError::MalformedOperation {
                reason: format!(
                    "parameter '{name}' requires 'in' of path, query, header or cookie"
                ),
            })?;
        // Path parameters are required by definition.
        let required = location == Location::Path
            || node.get("required").and_then(Value::as_bool).unwrap_or(false);

        // Repeated-key assembly follows `style: form` defaults: exploded
        // for query and cookie, comma-joined elsewhere.
        let explode = node
            .get("explode")
            .and_then(Value::as_bool)
            .unwrap_or(matches!(location, Location::Query | Location::Cookie));

        let raw_schema = node.get("schema");
        let validator = match raw_schema {
            Some(schema_node) => Some(SchemaValidator::new(
                Arc::clone(context),
                format!("{location}.{name}"),
                schema_node,
            )?),
            None => None,
        };
        let schema = match raw_schema {
            Some(schema_node) => Some(coercion_schema(context.document(), schema_node)?),
            None => None,
        };
        Ok(Self { name, location, required, explode, schema, validator })
    }

    /// Build a response-header validator from a `headers` map entry, which
    /// carries no `name`/`in` of its own.
    pub(crate) fn for_response_header(
        context: &Arc<ValidationContext>,
        name: &str,
        node: &Value,
    ) -> Result<Self, CompileError> {
        let raw_schema = node.get("schema");
        let validator = match raw_schema {
            Some(schema_node) => Some(SchemaValidator::new(
                Arc::clone(context),
                format!("header.{name}"),
                schema_node,
            )?),
            None => None,
        };
        let schema = match raw_schema {
            Some(schema_node) => Some(coercion_schema(context.document(), schema_node)?),
            None => None,
        };
        Ok(Self {
            name: name.to_string(),
            location: Location::Header,
            required: node.get("required").and_then(Value::as_bool).unwrap_or(false),
            explode: node.get("explode").and_then(Value::as_bool).unwrap_or(false),
            schema,
            validator,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn required(&self) -> bool {
        self.required
    }

    /// True when the declared schema type is `array`.
    pub fn is_array(&self) -> bool {
        self.schema
            .as_ref()
            .and_then(|schema| schema.get("type"))
            .and_then(Value::as_str)
            == Some("array")
    }

    /// Whether repeated occurrences of the key each carry one array item.
    pub fn explode(&self) -> bool {
        self.explode
    }

    /// Coerce and validate a raw value, storing the coerced value as the
    /// data payload on success.
    pub fn validate(&self, raw: Option<&str>, data: &mut ValidationData<Value>) {
        if let Some(value) = self.check(raw, data.results_mut()) {
            data.set_payload(value);
        }
    }

    /// Coerce and validate a raw value against a bare accumulator,
    /// returning the coerced value when coercion succeeded.
    pub fn check(&self, raw: Option<&str>, results: &mut ValidationResults) -> Option<Value> {
        let Some(raw) = raw else {
            if self.required {
                results.error(format!(
                    "missing required {} parameter '{}'",
                    self.location, self.name
                ));
            }
            return None;
        };
        match coerce(raw, self.schema.as_ref()) {
            Ok(value) => {
                if let Some(validator) = &self.validator {
                    results.in_data_key(self.name.clone(), |r| {
                        validator.validate_into(&value, r);
                    });
                }
                Some(value)
            }
            Err(reason) => {
                results.in_data_key(self.name.clone(), |r| {
                    r.error(format!(
                        "invalid {} parameter '{}': {reason}",
                        self.location, self.name
                    ));
                });
                None
            }
        }
    }

    /// Assemble repeated raw occurrences of an exploded array parameter
    /// into one array, coercing each occurrence by the item type, then
    /// validate the whole array.
    pub fn check_exploded(
        &self,
        raw: &[String],
        results: &mut ValidationResults,
    ) -> Option<Value> {
        let item_schema = self.schema.as_ref().and_then(|schema| schema.get("items"));
        let item_type = item_schema.and_then(|items| items.get("type")).and_then(Value::as_str);
        let mut items = Vec::with_capacity(raw.len());
        for occurrence in raw {
            match coerce_typed(occurrence, item_type, item_schema) {
                Ok(item) => items.push(item),
                Err(reason) => {
                    results.in_data_key(self.name.clone(), |r| {
                        r.error(format!(
                            "invalid {} parameter '{}': {reason}",
                            self.location, self.name
                        ));
                    });
                    return None;
                }
            }
        }
        let value = Value::Array(items);
        if let Some(validator) = &self.validator {
            results.in_data_key(self.name.clone(), |r| {
                validator.validate_into(&value, r);
            });
        }
        Some(value)
    }
}

impl std::fmt::Debug for ParameterValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterValidator")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("required", &self.required)
            .finish()
    }
}

/// Build a context-free parameter validator for a standalone document.
/// Convenience for adapters validating a single parameter definition.
pub fn parameter_for_document(
    document: Arc<Document>,
    node: &Value,
) -> Result<ParameterValidator, CompileError> {
    let context = Arc::new(ValidationContext::new(document));
    ParameterValidator::new(&context, node)
}

/// Resolve `$ref` indirection on a parameter schema (and its `items`) so
/// coercion reads the target's declared `type` rather than treating the
/// reference object as untyped. The schema compile above has already
/// rejected reference cycles, so the chase terminates.
fn coercion_schema(document: &Arc<Document>, node: &Value) -> Result<Value, CompileError> {
    let mut schema = node.clone();
    while let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        schema = document.resolve(reference, "parameter schema")?.clone();
    }
    if let Some(items) = schema.get("items") {
        if items.get("$ref").is_some() {
            let mut item = items.clone();
            while let Some(reference) = item.get("$ref").and_then(Value::as_str) {
                item = document.resolve(reference, "parameter items")?.clone();
            }
            schema["items"] = item;
        }
    }
    Ok(schema)
}

/// Coerce a raw textual value into the value-tree shape the schema's
/// declared `type` expects. No declared type reads as a string.
fn coerce(raw: &str, schema: Option<&Value>) -> Result<Value, String> {
    let declared = schema.and_then(|s| s.get("type")).and_then(Value::as_str);
    coerce_typed(raw, declared, schema)
}

fn coerce_typed(
    raw: &str,
    declared: Option<&str>,
    schema: Option<&Value>,
) -> Result<Value, String> {
    match declared {
        None | Some("string") => Ok(Value::String(raw.to_string())),
        Some("boolean") => match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(format!("'{raw}' is not a boolean")),
        },
        Some("integer") => {
            if raw.is_empty() {
                return Err("empty value is not an integer".to_string());
            }
            raw.parse::<i64>()
                .map(Value::from)
                .map_err(|_| format!("'{raw}' is not an integer"))
        }
        Some("number") => {
            if raw.is_empty() {
                return Err("empty value is not a number".to_string());
            }
            // Rust's float parser accepts "inf"/"NaN" spellings; the wire
            // format does not.
            if raw.chars().any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E')) {
                return Err(format!("'{raw}' is not a number"));
            }
            let parsed: f64 =
                raw.parse().map_err(|_| format!("'{raw}' is not a number"))?;
            Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| format!("'{raw}' is not a finite number"))
        }
        Some("array") => {
            let item_type = schema
                .and_then(|s| s.get("items"))
                .and_then(|items| items.get("type"))
                .and_then(Value::as_str);
            let item_schema = schema.and_then(|s| s.get("items"));
            raw.split(',')
                .map(|item| coerce_typed(item, item_type, item_schema))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        Some("object") => {
            // Simple style: alternating key,value tokens.
            let tokens: Vec<&str> = if raw.is_empty() {
                Vec::new()
            } else {
                raw.split(',').collect()
            };
            if tokens.len() % 2 != 0 {
                return Err("object value needs an even number of comma-separated tokens"
                    .to_string());
            }
            let mut map = Map::new();
            for pair in tokens.chunks(2) {
                map.insert(pair[0].to_string(), Value::String(pair[1].to_string()));
            }
            Ok(Value::Object(map))
        }
        Some(other) => Err(format!("cannot coerce a textual value to type '{other}'")),
    }
}
