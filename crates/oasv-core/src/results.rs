//! # Validation Results
//!
//! The evaluation-tier error channel. Validators never return `Err` for a
//! contract violation; they append [`ValidationResult`] entries to a
//! [`ValidationResults`] accumulator. Each entry carries two breadcrumbs:
//! the path through the *schema* (keywords, property names) that produced
//! the finding, and the path through the *instance* (keys, indices) it
//! applies to.
//!
//! [`ValidationData`] wraps an accumulator together with a generic
//! side-channel slot, used by parameter validation to hand the coerced
//! scalar value back to the caller.

use std::fmt;

use serde::Serialize;

/// Severity of a single finding.
///
/// Only `Error` entries make an accumulator invalid; `Warning` is for
/// advisory checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    /// Advisory finding; does not fail validation.
    Warning,
    /// Contract violation; fails validation.
    Error,
}

/// One step of an instance-side breadcrumb.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum DataCrumb {
    /// Descent into an object property.
    Key(String),
    /// Descent into an array element.
    Index(usize),
}

impl fmt::Display for DataCrumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataCrumb::Key(k) => write!(f, "{k}"),
            DataCrumb::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A single validation finding with structured context.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// Whether this finding fails validation.
    pub severity: ValidationSeverity,
    /// Human-readable description of the violation.
    pub message: String,
    /// Keyword/property steps from the schema root to the rule that fired.
    pub schema_path: Vec<String>,
    /// Key/index steps from the instance root to the offending value.
    pub data_path: Vec<DataCrumb>,
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            ValidationSeverity::Warning => "warning",
            ValidationSeverity::Error => "error",
        };
        write!(f, "{severity}: ")?;
        if self.data_path.is_empty() {
            write!(f, "(root)")?;
        } else {
            for crumb in &self.data_path {
                write!(f, "/{crumb}")?;
            }
        }
        write!(f, ": {}", self.message)?;
        if !self.schema_path.is_empty() {
            write!(f, " (schema: {})", self.schema_path.join("/"))?;
        }
        Ok(())
    }
}

/// Append-only accumulator of findings for one validation run.
///
/// Carries the current schema-side and data-side crumb stacks; entries added
/// through [`error`](Self::error) / [`warning`](Self::warning) snapshot both
/// stacks. Nested validators scope their crumbs with the `in_*` helpers.
///
/// ## Concurrency
///
/// Single-writer: one validation call owns one accumulator.
#[derive(Debug, Clone, Default)]
pub struct ValidationResults {
    items: Vec<ValidationResult>,
    schema_crumbs: Vec<String>,
    data_crumbs: Vec<DataCrumb>,
}

impl ValidationResults {
    /// Fresh, empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding at the current breadcrumb position.
    pub fn add(&mut self, severity: ValidationSeverity, message: impl Into<String>) {
        self.items.push(ValidationResult {
            severity,
            message: message.into(),
            schema_path: self.schema_crumbs.clone(),
            data_path: self.data_crumbs.clone(),
        });
    }

    /// Append an error finding.
    pub fn error(&mut self, message: impl Into<String>) {
        self.add(ValidationSeverity::Error, message);
    }

    /// Append a warning finding.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.add(ValidationSeverity::Warning, message);
    }

    /// Run `f` with `crumb` pushed on the schema-side breadcrumb.
    pub fn in_schema_crumb<F>(&mut self, crumb: impl Into<String>, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.schema_crumbs.push(crumb.into());
        f(self);
        self.schema_crumbs.pop();
    }

    /// Run `f` with an object-key step pushed on the data-side breadcrumb.
    pub fn in_data_key<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.data_crumbs.push(DataCrumb::Key(key.into()));
        f(self);
        self.data_crumbs.pop();
    }

    /// Run `f` with an array-index step pushed on the data-side breadcrumb.
    pub fn in_data_index<F>(&mut self, index: usize, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.data_crumbs.push(DataCrumb::Index(index));
        f(self);
        self.data_crumbs.pop();
    }

    /// True if no `Error` entry has been recorded.
    pub fn is_valid(&self) -> bool {
        self.items.iter().all(|r| r.severity != ValidationSeverity::Error)
    }

    /// All recorded findings, in append order.
    pub fn items(&self) -> &[ValidationResult] {
        &self.items
    }

    /// Number of recorded findings.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Absorb findings from a scratch accumulator, prefixing them with this
    /// accumulator's current breadcrumbs. Used by composition keywords that
    /// trial-evaluate branches before deciding what to report.
    pub fn absorb(&mut self, scratch: ValidationResults) {
        for mut item in scratch.items {
            let mut schema_path = self.schema_crumbs.clone();
            schema_path.append(&mut item.schema_path);
            item.schema_path = schema_path;

            let mut data_path = self.data_crumbs.clone();
            data_path.append(&mut item.data_path);
            item.data_path = data_path;

            self.items.push(item);
        }
    }
}

impl fmt::Display for ValidationResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

/// Per-call validation state: the findings accumulator plus an optional
/// side-channel payload.
///
/// The payload slot is written by parameter validation with the coerced
/// scalar value of a path/query/header/cookie parameter, so gateways can
/// reuse the decoded value without re-parsing the raw string.
#[derive(Debug, Clone, Default)]
pub struct ValidationData<T = ()> {
    results: ValidationResults,
    payload: Option<T>,
}

impl<T> ValidationData<T> {
    /// Fresh accumulator with an empty payload slot.
    pub fn new() -> Self {
        Self { results: ValidationResults::new(), payload: None }
    }

    /// True if no error-severity finding has been recorded.
    pub fn is_valid(&self) -> bool {
        self.results.is_valid()
    }

    /// The findings accumulator.
    pub fn results(&self) -> &ValidationResults {
        &self.results
    }

    /// Mutable access for validators appending findings.
    pub fn results_mut(&mut self) -> &mut ValidationResults {
        &mut self.results
    }

    /// Store the side-channel payload.
    pub fn set_payload(&mut self, payload: T) {
        self.payload = Some(payload);
    }

    /// Read the side-channel payload, if one was produced.
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    /// Take ownership of the side-channel payload.
    pub fn take_payload(&mut self) -> Option<T> {
        self.payload.take()
    }
}
