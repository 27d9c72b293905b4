//! # Operation Validation
//!
//! An [`OperationValidator`] compiles everything one contract operation
//! declares: the path template, the merged parameter set, the request-body
//! content map, and the per-status response entries. Construction resolves
//! every `$ref` and compiles every schema once; the facet entry points
//! (`validate_path`, `validate_query`, ... `validate_response_body`) then
//! evaluate messages without touching the contract again.
//!
//! ## Body policies
//!
//! Requests and responses share content negotiation but differ on absence:
//! a declared-required request body must be present and a request body
//! needs a `Content-Type` header when a schema is declared, while an absent
//! response body or an undeclared response status passes. The asymmetry is
//! explicit in [`BodyPolicy`].

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use oasv_core::{CompileError, Document, ValidationData, ValidationResults};
use oasv_schema::{SchemaValidator, ValidationContext};

use crate::body::Body;
use crate::content::MediaType;
use crate::parameter::{Location, ParameterValidator};
use crate::path::{self, PathTemplate};
use crate::request::{Method, Request, Response};

/// Which absence rules apply when validating a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPolicy {
    /// Strict: a required body must be present; a body sent without a
    /// `Content-Type` header is an error when a schema is declared.
    Request,
    /// Tolerant: an absent body passes; only a declared schema with no
    /// `Content-Type` header on the message is an error.
    Response,
}

/// One entry of a `content` map: the declared media range plus the compiled
/// schema, when one was given.
struct ContentEntry {
    declared: MediaType,
    validator: Option<SchemaValidator>,
}

struct BodyContract {
    required: bool,
    entries: Vec<ContentEntry>,
}

struct ResponseContract {
    entries: Vec<ContentEntry>,
    headers: Vec<ParameterValidator>,
}

/// Compiled validator for one operation of a contract.
///
/// Immutable after construction; share with `Arc` for concurrent use.
pub struct OperationValidator {
    template: PathTemplate,
    parameters: Vec<ParameterValidator>,
    request_body: Option<BodyContract>,
    responses: Vec<(String, ResponseContract)>,
}

impl OperationValidator {
    /// Compile an operation under a fresh default context.
    ///
    /// `path_item` must be a node of `document`'s `paths` map (directly or
    /// through `$ref`); the path template is recovered by value equality,
    /// so when two templates carry structurally identical items the first
    /// one wins. [`OperationValidator::for_path`] addresses the item by its
    /// template instead and stays unambiguous.
    ///
    /// # Errors
    ///
    /// Fatal construction errors only: unresolved references, malformed
    /// definitions, schema compilation failures.
    pub fn new(
        document: &Arc<Document>,
        path_item: &Value,
        operation: &Value,
    ) -> Result<Self, CompileError> {
        let context = Arc::new(ValidationContext::new(Arc::clone(document)));
        let template = find_template(document, path_item)?;
        Self::build(&context, &template, path_item, operation)
    }

    /// Compile an operation under a caller-supplied context, sharing its
    /// keyword overrides, options and fragment registry.
    ///
    /// # Errors
    ///
    /// [`CompileError::DocumentMismatch`] when the context is bound to a
    /// different document, plus everything [`OperationValidator::new`] can
    /// return.
    pub fn with_context(
        document: &Arc<Document>,
        context: &Arc<ValidationContext>,
        path_item: &Value,
        operation: &Value,
    ) -> Result<Self, CompileError> {
        if context.document().base_uri() != document.base_uri() {
            return Err(CompileError::DocumentMismatch {
                context_base: context.document().base_uri().to_string(),
                schema_base: document.base_uri().to_string(),
            });
        }
        let template = find_template(document, path_item)?;
        Self::build(context, &template, path_item, operation)
    }

    /// Compile the operation declared at `template` for `method` under a
    /// fresh default context.
    ///
    /// # Errors
    ///
    /// [`CompileError::MalformedOperation`] when the template or the method
    /// is not declared, plus everything [`OperationValidator::new`] can
    /// return.
    pub fn for_path(
        document: &Arc<Document>,
        template: &str,
        method: Method,
    ) -> Result<Self, CompileError> {
        let context = Arc::new(ValidationContext::new(Arc::clone(document)));
        let paths = document
            .root()
            .get("paths")
            .and_then(Value::as_object)
            .ok_or_else(|| CompileError::MalformedOperation {
                reason: "contract has no 'paths' map".to_string(),
            })?;
        let item = paths.get(template).ok_or_else(|| CompileError::MalformedOperation {
            reason: format!("no path item declared for '{template}'"),
        })?;
        let item = resolve_node(document, item, template)?;
        let operation =
            item.get(method.as_str()).ok_or_else(|| CompileError::MalformedOperation {
                reason: format!("'{template}' declares no {} operation", method.as_str()),
            })?;
        Self::build(&context, template, &item, operation)
    }

    /// Locate an operation by its `operationId` and compile it.
    ///
    /// # Errors
    ///
    /// [`CompileError::MalformedOperation`] when no operation carries the
    /// id, plus everything [`OperationValidator::new`] can return.
    pub fn by_operation_id(
        document: &Arc<Document>,
        operation_id: &str,
    ) -> Result<Self, CompileError> {
        let context = Arc::new(ValidationContext::new(Arc::clone(document)));
        let paths = document
            .root()
            .get("paths")
            .and_then(Value::as_object)
            .ok_or_else(|| CompileError::MalformedOperation {
                reason: "contract has no 'paths' map".to_string(),
            })?;
        for (template, item) in paths {
            let item = resolve_node(document, item, "paths")?;
            for method in Method::all() {
                if let Some(operation) = item.get(method.as_str()) {
                    if operation.get("operationId").and_then(Value::as_str)
                        == Some(operation_id)
                    {
                        return Self::build(&context, template, &item, operation);
                    }
                }
            }
        }
        Err(CompileError::MalformedOperation {
            reason: format!("no operation with operationId '{operation_id}'"),
        })
    }

    fn build(
        context: &Arc<ValidationContext>,
        template: &str,
        path_item: &Value,
        operation: &Value,
    ) -> Result<Self, CompileError> {
        tracing::debug!(template, "compiling operation validator");
        let document = Arc::clone(context.document());
        let template = PathTemplate::parse(template)?;

        // Path-item parameters first, operation-level entries override on
        // the same (location, name) key.
        let mut merged: IndexMap<(String, String), Value> = IndexMap::new();
        for scope in [path_item, operation] {
            let Some(nodes) = scope.get("parameters") else { continue };
            let nodes = nodes.as_array().ok_or_else(|| CompileError::MalformedOperation {
                reason: "'parameters' must be an array".to_string(),
            })?;
            for node in nodes {
                let node = resolve_node(&document, node, "parameters")?;
                let key = parameter_key(&node)?;
                merged.insert(key, node);
            }
        }
        let parameters = merged
            .values()
            .map(|node| ParameterValidator::new(context, node))
            .collect::<Result<Vec<_>, _>>()?;

        let request_body = match operation.get("requestBody") {
            Some(node) => {
                let node = resolve_node(&document, node, "requestBody")?;
                Some(BodyContract {
                    required: node.get("required").and_then(Value::as_bool).unwrap_or(false),
                    entries: content_entries(context, node.get("content"), "requestBody")?,
                })
            }
            None => None,
        };

        let mut responses = Vec::new();
        if let Some(map) = operation.get("responses").and_then(Value::as_object) {
            for (status, node) in map {
                let node = resolve_node(&document, node, status)?;
                let entries =
                    content_entries(context, node.get("content"), &format!("responses.{status}"))?;
                let mut headers = Vec::new();
                if let Some(declared) = node.get("headers").and_then(Value::as_object) {
                    for (name, header_node) in declared {
                        let header_node = resolve_node(&document, header_node, name)?;
                        headers.push(ParameterValidator::for_response_header(
                            context,
                            name,
                            &header_node,
                        )?);
                    }
                }
                responses.push((status.clone(), ResponseContract { entries, headers }));
            }
        }

        Ok(Self { template, parameters, request_body, responses })
    }

    /// The compiled path template.
    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    fn parameters_in(&self, location: Location) -> impl Iterator<Item = &ParameterValidator> {
        self.parameters.iter().filter(move |p| p.location() == location)
    }

    fn parameter(&self, location: Location, name: &str) -> Option<&ParameterValidator> {
        self.parameters_in(location).find(|p| p.name() == name)
    }

    /// Match the request path against the template and validate every
    /// captured path parameter. A non-matching path is a single finding.
    pub fn validate_path<T>(&self, request: &Request, data: &mut ValidationData<T>) {
        let results = data.results_mut();
        let concrete = path::request_path(request.path());
        let Some(captures) = self.template.captures(concrete) else {
            results.error(format!(
                "path '{concrete}' does not match template '{}'",
                self.template.template()
            ));
            return;
        };
        for (name, raw) in &captures {
            // Template variables without a parameter declaration are ignored.
            if let Some(parameter) = self.parameter(Location::Path, name) {
                parameter.check(Some(raw), results);
            }
        }
        for parameter in self.parameters_in(Location::Path) {
            if !captures.iter().any(|(name, _)| name == parameter.name()) {
                parameter.check(None, results);
            }
        }
    }

    /// Validate declared query parameters against the request's query
    /// string. Undeclared query parameters are ignored. Repeated keys of an
    /// exploded array parameter (the `style: form` default) assemble into
    /// one array; otherwise the first occurrence is taken.
    pub fn validate_query<T>(&self, request: &Request, data: &mut ValidationData<T>) {
        let results = data.results_mut();
        let params = request.query_params();
        for parameter in self.parameters_in(Location::Query) {
            match params.get(parameter.name()) {
                Some(values) if parameter.is_array() && parameter.explode() => {
                    parameter.check_exploded(values, results);
                }
                Some(values) => {
                    parameter.check(values.first().map(String::as_str), results);
                }
                None => {
                    parameter.check(None, results);
                }
            }
        }
    }

    /// Validate declared header parameters. Header names compare
    /// case-insensitively.
    pub fn validate_headers<T>(&self, request: &Request, data: &mut ValidationData<T>) {
        let results = data.results_mut();
        for parameter in self.parameters_in(Location::Header) {
            parameter.check(request.header(parameter.name()), results);
        }
    }

    /// Validate declared cookie parameters.
    pub fn validate_cookies<T>(&self, request: &Request, data: &mut ValidationData<T>) {
        let results = data.results_mut();
        for parameter in self.parameters_in(Location::Cookie) {
            parameter.check(request.cookie(parameter.name()), results);
        }
    }

    /// Validate the request body under [`BodyPolicy::Request`].
    pub fn validate_body<T>(&self, request: &Request, data: &mut ValidationData<T>) {
        let Some(contract) = &self.request_body else { return };
        let results = data.results_mut();
        let Some(body) = request.body() else {
            if contract.required {
                results.error("required request body is missing");
            }
            return;
        };
        check_body(
            &contract.entries,
            request.content_type(),
            Some(body),
            BodyPolicy::Request,
            results,
        );
    }

    /// Validate declared headers of the response entry matching the status.
    pub fn validate_response_headers<T>(
        &self,
        response: &Response,
        data: &mut ValidationData<T>,
    ) {
        let Some(contract) = self.response_contract(response.status()) else { return };
        let results = data.results_mut();
        for parameter in &contract.headers {
            parameter.check(response.header(parameter.name()), results);
        }
    }

    /// Validate the response body under [`BodyPolicy::Response`]: an
    /// undeclared status or an absent body passes.
    pub fn validate_response_body<T>(&self, response: &Response, data: &mut ValidationData<T>) {
        let Some(contract) = self.response_contract(response.status()) else { return };
        check_body(
            &contract.entries,
            response.content_type(),
            response.body(),
            BodyPolicy::Response,
            data.results_mut(),
        );
    }

    /// Run every request-side facet.
    pub fn validate_request<T>(&self, request: &Request, data: &mut ValidationData<T>) {
        self.validate_path(request, data);
        self.validate_query(request, data);
        self.validate_headers(request, data);
        self.validate_cookies(request, data);
        self.validate_body(request, data);
    }

    /// Run every response-side facet.
    pub fn validate_response<T>(&self, response: &Response, data: &mut ValidationData<T>) {
        self.validate_response_headers(response, data);
        self.validate_response_body(response, data);
    }

    /// Select the response entry for a status: exact code first, then the
    /// status class (`"5XX"`), then `default`.
    fn response_contract(&self, status: u16) -> Option<&ResponseContract> {
        let exact = status.to_string();
        if let Some((_, contract)) = self.responses.iter().find(|(key, _)| *key == exact) {
            return Some(contract);
        }
        let class = format!("{}XX", status / 100);
        if let Some((_, contract)) =
            self.responses.iter().find(|(key, _)| key.eq_ignore_ascii_case(&class))
        {
            return Some(contract);
        }
        self.responses
            .iter()
            .find(|(key, _)| key == "default")
            .map(|(_, contract)| contract)
    }
}

impl std::fmt::Debug for OperationValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationValidator")
            .field("template", &self.template.template())
            .field("parameters", &self.parameters)
            .field("responses", &self.responses.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish()
    }
}

/// Shared content negotiation and schema evaluation for both policies.
fn check_body(
    entries: &[ContentEntry],
    content_type: Option<&str>,
    body: Option<&Body>,
    policy: BodyPolicy,
    results: &mut ValidationResults,
) {
    let declares_schema = entries.iter().any(|entry| entry.validator.is_some());
    let Some(content_type) = content_type else {
        match policy {
            BodyPolicy::Request if declares_schema => {
                results.error("Content-Type header is required for the request body");
            }
            BodyPolicy::Response if declares_schema => {
                results.error("Content-Type header is required for the declared response body");
            }
            _ => {}
        }
        return;
    };
    let Some(media) = MediaType::parse(content_type) else {
        results.error(format!("cannot parse Content-Type '{content_type}'"));
        return;
    };

    // Most specific declared range wins; no match means no contract.
    let Some(entry) = entries
        .iter()
        .filter(|entry| entry.declared.accepts(&media))
        .max_by_key(|entry| entry.declared.specificity())
    else {
        return;
    };

    if let (Some(declared), Some(actual)) = (entry.declared.charset(), media.charset()) {
        if declared != actual {
            results.error(format!(
                "charset '{actual}' does not match the declared charset '{declared}'"
            ));
            return;
        }
    }

    let Some(validator) = &entry.validator else { return };
    let Some(body) = body else {
        // A matched entry with no body to inspect: only the response policy
        // reaches here, and it tolerates the absence.
        return;
    };
    if media.is_json() || media.is_text() {
        match body.decode(&media) {
            Ok(value) => validator.validate_into(&value, results),
            Err(e) => results.error(format!("cannot decode body as {}: {e}", media.essence())),
        }
    }
    // Binary media types carry no structural contract to evaluate.
}

fn resolve_node(
    document: &Document,
    node: &Value,
    location: &str,
) -> Result<Value, CompileError> {
    match node.get("$ref").and_then(Value::as_str) {
        Some(reference) => Ok(document.resolve(reference, location)?.clone()),
        None => Ok(node.clone()),
    }
}

fn parameter_key(node: &Value) -> Result<(String, String), CompileError> {
    let name = node.get("name").and_then(Value::as_str).ok_or_else(|| {
        CompileError::MalformedOperation {
            reason: "parameter requires a string 'name'".to_string(),
        }
    })?;
    let location = node.get("in").and_then(Value::as_str).ok_or_else(|| {
        CompileError::MalformedOperation {
            reason: format!("parameter '{name}' requires a string 'in'"),
        }
    })?;
    Ok((location.to_string(), name.to_string()))
}

fn content_entries(
    context: &Arc<ValidationContext>,
    content: Option<&Value>,
    location: &str,
) -> Result<Vec<ContentEntry>, CompileError> {
    let Some(content) = content else { return Ok(Vec::new()) };
    let map = content.as_object().ok_or_else(|| CompileError::MalformedOperation {
        reason: format!("'content' of {location} must be an object"),
    })?;
    let mut entries = Vec::with_capacity(map.len());
    for (key, media_node) in map {
        let declared =
            MediaType::parse(key).ok_or_else(|| CompileError::MalformedOperation {
                reason: format!("cannot parse content key '{key}' of {location}"),
            })?;
        let validator = match media_node.get("schema") {
            Some(schema) => Some(SchemaValidator::new(
                Arc::clone(context),
                format!("{location}.{key}"),
                schema,
            )?),
            None => None,
        };
        entries.push(ContentEntry { declared, validator });
    }
    Ok(entries)
}

fn find_template(document: &Arc<Document>, path_item: &Value) -> Result<String, CompileError> {
    let paths = document
        .root()
        .get("paths")
        .and_then(Value::as_object)
        .ok_or_else(|| CompileError::MalformedOperation {
            reason: "contract has no 'paths' map".to_string(),
        })?;
    for (template, item) in paths {
        let item = resolve_node(document, item, "paths")?;
        if &item == path_item {
            return Ok(template.clone());
        }
    }
    Err(CompileError::MalformedOperation {
        reason: "path item does not belong to the contract's 'paths' map".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contract() -> Arc<Document> {
        Arc::new(Document::new(
            json!({
                "paths": {
                    "/pets/{petId}": {
                        "parameters": [
                            {"name": "petId", "in": "path", "required": true,
                             "schema": {"type": "integer", "minimum": 1}}
                        ],
                        "get": {
                            "operationId": "getPet",
                            "parameters": [
                                {"name": "verbose", "in": "query",
                                 "schema": {"type": "boolean"}},
                                {"name": "X-Request-Id", "in": "header", "required": true,
                                 "schema": {"type": "string", "minLength": 4}}
                            ],
                            "responses": {
                                "200": {
                                    "content": {"application/json": {
                                        "schema": {"type": "object",
                                                   "required": ["name"],
                                                   "properties": {"name": {"type": "string"}}}
                                    }},
                                    "headers": {"X-Rate-Limit": {
                                        "required": true,
                                        "schema": {"type": "integer"}
                                    }}
                                },
                                "5XX": {"content": {"application/json": {
                                    "schema": {"type": "object"}}}},
                                "default": {"content": {}}
                            }
                        },
                        "post": {
                            "operationId": "renamePet",
                            "requestBody": {
                                "required": true,
                                "content": {"application/json": {
                                    "schema": {"type": "object",
                                               "required": ["name"],
                                               "properties": {"name": {"type": "string"}}}
                                }}
                            },
                            "responses": {}
                        }
                    }
                }
            }),
            "mem://contract",
        ))
    }

    fn operation(document: &Arc<Document>, id: &str) -> OperationValidator {
        OperationValidator::by_operation_id(document, id).unwrap()
    }

    #[test]
    fn test_construction_recovers_the_template() {
        let document = contract();
        let v = operation(&document, "getPet");
        assert_eq!(v.template().template(), "/pets/{petId}");
    }

    #[test]
    fn test_new_locates_path_item_by_identity() {
        let document = contract();
        let path_item = document.resolve("#/paths/~1pets~1{petId}", "t").unwrap().clone();
        let op = path_item["get"].clone();
        let v = OperationValidator::new(&document, &path_item, &op).unwrap();
        assert_eq!(v.template().template(), "/pets/{petId}");
    }

    #[test]
    fn test_with_context_rejects_foreign_document() {
        let document = contract();
        let other = Arc::new(Document::new(json!({}), "mem://other"));
        let foreign = Arc::new(ValidationContext::new(other));
        let path_item = document.resolve("#/paths/~1pets~1{petId}", "t").unwrap().clone();
        let err = OperationValidator::with_context(
            &document,
            &foreign,
            &path_item,
            &path_item["get"],
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::DocumentMismatch { .. }), "got: {err}");
    }

    #[test]
    fn test_path_facet_checks_captured_parameters() {
        let document = contract();
        let v = operation(&document, "getPet");

        let good = Request::builder("/pets/42", Method::Get).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_path(&good, &mut data);
        assert!(data.is_valid(), "{}", data.results());

        // Coerces to 0, then the schema minimum fires.
        let zero = Request::builder("/pets/0", Method::Get).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_path(&zero, &mut data);
        assert!(!data.is_valid());

        let unmatched = Request::builder("/stores/42", Method::Get).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_path(&unmatched, &mut data);
        assert!(!data.is_valid());
    }

    #[test]
    fn test_path_facet_strips_scheme_and_host() {
        let document = contract();
        let v = operation(&document, "getPet");
        let request =
            Request::builder("https://api.example.com/pets/7?verbose=true", Method::Get).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_path(&request, &mut data);
        assert!(data.is_valid(), "{}", data.results());
    }

    #[test]
    fn test_query_facet_coerces_and_ignores_undeclared() {
        let document = contract();
        let v = operation(&document, "getPet");

        let good = Request::builder("/pets/1?verbose=true&unknown=x", Method::Get).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_query(&good, &mut data);
        assert!(data.is_valid(), "{}", data.results());

        let bad = Request::builder("/pets/1?verbose=yes", Method::Get).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_query(&bad, &mut data);
        assert!(!data.is_valid());
    }

    #[test]
    fn test_repeated_query_keys_assemble_into_an_array() {
        let document = Arc::new(Document::new(
            json!({
                "paths": {"/items": {"get": {
                    "operationId": "listItems",
                    "parameters": [
                        {"name": "tag", "in": "query",
                         "schema": {"type": "array", "maxItems": 3,
                                    "items": {"type": "integer"}}},
                        {"name": "ids", "in": "query", "explode": false,
                         "schema": {"type": "array",
                                    "items": {"type": "integer"}}}
                    ],
                    "responses": {}
                }}}
            }),
            "mem://contract",
        ));
        let v = operation(&document, "listItems");

        let good = Request::builder("/items?tag=1&tag=2", Method::Get).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_query(&good, &mut data);
        assert!(data.is_valid(), "{}", data.results());

        // Each occurrence coerces as one item.
        let bad_item = Request::builder("/items?tag=1&tag=x", Method::Get).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_query(&bad_item, &mut data);
        assert!(!data.is_valid());

        // The assembled array still hits the array-level keywords.
        let long = Request::builder("/items?tag=1&tag=2&tag=3&tag=4", Method::Get).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_query(&long, &mut data);
        assert!(!data.is_valid());

        // explode: false keeps the comma-joined single-occurrence form.
        let csv = Request::builder("/items?ids=1,2,3", Method::Get).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_query(&csv, &mut data);
        assert!(data.is_valid(), "{}", data.results());
    }

    #[test]
    fn test_for_path_addresses_operations_by_template() {
        let document = contract();
        let v = OperationValidator::for_path(&document, "/pets/{petId}", Method::Get).unwrap();
        assert_eq!(v.template().template(), "/pets/{petId}");

        let err =
            OperationValidator::for_path(&document, "/stores/{id}", Method::Get).unwrap_err();
        assert!(matches!(err, CompileError::MalformedOperation { .. }), "got: {err}");
        let err =
            OperationValidator::for_path(&document, "/pets/{petId}", Method::Delete).unwrap_err();
        assert!(matches!(err, CompileError::MalformedOperation { .. }), "got: {err}");
    }

    #[test]
    fn test_header_facet_is_case_insensitive() {
        let document = contract();
        let v = operation(&document, "getPet");

        let good = Request::builder("/pets/1", Method::Get)
            .header("x-request-id", "abcd")
            .build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_headers(&good, &mut data);
        assert!(data.is_valid(), "{}", data.results());

        let missing = Request::builder("/pets/1", Method::Get).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_headers(&missing, &mut data);
        assert!(!data.is_valid());
    }

    #[test]
    fn test_required_body_must_be_present() {
        let document = contract();
        let v = operation(&document, "renamePet");
        let request = Request::builder("/pets/1", Method::Post).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_body(&request, &mut data);
        assert!(!data.is_valid());
    }

    #[test]
    fn test_body_schema_validates_decoded_payload() {
        let document = contract();
        let v = operation(&document, "renamePet");

        let good = Request::builder("/pets/1", Method::Post)
            .header("Content-Type", "application/json")
            .body(json!({"name": "Rex"}))
            .build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_body(&good, &mut data);
        assert!(data.is_valid(), "{}", data.results());

        let bad = Request::builder("/pets/1", Method::Post)
            .header("Content-Type", "application/json")
            .body(json!({"nickname": "Rex"}))
            .build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_body(&bad, &mut data);
        assert!(!data.is_valid());
    }

    #[test]
    fn test_body_without_content_type_errors_when_schema_declared() {
        let document = contract();
        let v = operation(&document, "renamePet");
        let request = Request::builder("/pets/1", Method::Post)
            .body(json!({"name": "Rex"}))
            .build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_body(&request, &mut data);
        assert!(!data.is_valid());
    }

    #[test]
    fn test_unmatched_content_type_is_vacuous() {
        let document = contract();
        let v = operation(&document, "renamePet");
        let request = Request::builder("/pets/1", Method::Post)
            .header("Content-Type", "application/xml")
            .body("<pet/>")
            .build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_body(&request, &mut data);
        assert!(data.is_valid(), "{}", data.results());
    }

    #[test]
    fn test_response_status_selection() {
        let document = contract();
        let v = operation(&document, "getPet");

        // Exact match: 200 declares a schema requiring "name".
        let bad = Response::builder(200)
            .header("Content-Type", "application/json")
            .body(json!({"nickname": "x"}))
            .build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_response_body(&bad, &mut data);
        assert!(!data.is_valid());

        // 503 falls into the declared 5XX class.
        let class = Response::builder(503)
            .header("Content-Type", "application/json")
            .body(json!([1, 2]))
            .build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_response_body(&class, &mut data);
        assert!(!data.is_valid());

        // 404 lands on the schemaless default entry.
        let fallback = Response::builder(404).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_response_body(&fallback, &mut data);
        assert!(data.is_valid(), "{}", data.results());
    }

    #[test]
    fn test_undeclared_status_passes() {
        let document = contract();
        let v = operation(&document, "renamePet");
        let response = Response::builder(500).body(json!({"oops": true})).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_response_body(&response, &mut data);
        assert!(data.is_valid(), "{}", data.results());
    }

    #[test]
    fn test_absent_response_body_is_tolerated() {
        let document = contract();
        let v = operation(&document, "getPet");
        let response = Response::builder(200)
            .header("Content-Type", "application/json")
            .build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_response_body(&response, &mut data);
        assert!(data.is_valid(), "{}", data.results());
    }

    #[test]
    fn test_response_headers_follow_selected_entry() {
        let document = contract();
        let v = operation(&document, "getPet");

        let good = Response::builder(200).header("X-Rate-Limit", "10").build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_response_headers(&good, &mut data);
        assert!(data.is_valid(), "{}", data.results());

        let missing = Response::builder(200).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_response_headers(&missing, &mut data);
        assert!(!data.is_valid());
    }

    #[test]
    fn test_operation_parameters_override_path_item() {
        let document = Arc::new(Document::new(
            json!({
                "paths": {"/items": {
                    "parameters": [
                        {"name": "limit", "in": "query", "required": true,
                         "schema": {"type": "integer"}}
                    ],
                    "get": {
                        "operationId": "listItems",
                        "parameters": [
                            {"name": "limit", "in": "query",
                             "schema": {"type": "integer"}}
                        ],
                        "responses": {}
                    }
                }}
            }),
            "mem://contract",
        ));
        let v = operation(&document, "listItems");
        // The operation-level entry made the parameter optional.
        let request = Request::builder("/items", Method::Get).build();
        let mut data: ValidationData = ValidationData::new();
        v.validate_query(&request, &mut data);
        assert!(data.is_valid(), "{}", data.results());
    }

    #[test]
    fn test_unknown_operation_id_is_fatal() {
        let document = contract();
        let err = OperationValidator::by_operation_id(&document, "nope").unwrap_err();
        assert!(matches!(err, CompileError::MalformedOperation { .. }), "got: {err}");
    }
}
