//! `discriminator`, polymorphic dispatch.
//!
//! A discriminator names an instance property whose value selects one
//! concrete sub-schema. Selection is a lookup: the explicit `mapping` wins,
//! otherwise the value matches a candidate by schema-name convention
//! (a branch referencing `#/components/schemas/Cat` answers to `"Cat"`).
//!
//! When the discriminator sits next to `oneOf`/`anyOf`, the composition
//! validator narrows evaluation to the selected branch. A standalone
//! discriminator (the `allOf` inheritance style, declared on the parent)
//! checks the tag property, then validates the instance against the
//! selected schema through the shared fragment registry. The concrete
//! schemas reference the parent from inside themselves, so a per-thread
//! in-flight set skips a dispatch target that is already being evaluated
//! up-stack.

use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use oasv_core::{CompileError, ValidationResults};

use crate::context::ValidationContext;
use crate::schema::Compiler;
use crate::validators::composition::Branch;
use crate::validators::KeywordValidator;

/// Parsed `discriminator` keyword: the tag property plus the normalized
/// explicit mapping (tag value to canonical fragment).
pub(crate) struct Discriminator {
    property: String,
    mapping: Vec<(String, String)>,
}

impl Discriminator {
    pub(crate) fn parse(
        compiler: &Compiler<'_>,
        node: &Value,
    ) -> Result<Self, CompileError> {
        let map = node
            .as_object()
            .ok_or_else(|| compiler.malformed("discriminator", "discriminator must be an object"))?;
        let property = map
            .get("propertyName")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                compiler.malformed("discriminator", "discriminator requires a propertyName")
            })?
            .to_string();

        let mut mapping = Vec::new();
        if let Some(entries) = map.get("mapping") {
            let entries = entries.as_object().ok_or_else(|| {
                compiler.malformed("discriminator", "mapping must be an object")
            })?;
            for (tag, target) in entries {
                let target = target.as_str().ok_or_else(|| {
                    compiler.malformed("discriminator", "mapping targets must be strings")
                })?;
                mapping.push((tag.clone(), normalize_target(compiler, target)));
            }
        }
        Ok(Self { property, mapping })
    }

    /// The canonical fragment an instance's tag selects, `None` when the tag
    /// has no explicit mapping entry.
    fn mapped_fragment(&self, tag: &str) -> Option<&str> {
        self.mapping.iter().find(|(t, _)| t == tag).map(|(_, frag)| frag.as_str())
    }

    /// Read the tag property off an object instance, reporting findings for
    /// non-object values and missing tags.
    pub(crate) fn read_tag<'a>(
        &self,
        instance: &'a Value,
        results: &mut ValidationResults,
    ) -> Option<&'a str> {
        let Value::Object(map) = instance else {
            results.error(format!(
                "discriminator '{}' requires an object value",
                self.property
            ));
            return None;
        };
        match map.get(&self.property).and_then(Value::as_str) {
            Some(tag) => Some(tag),
            None => {
                results.error(format!(
                    "discriminator property '{}' is missing",
                    self.property
                ));
                None
            }
        }
    }

    /// Pick the candidate branch the instance's tag selects. Appends a
    /// finding and returns `None` when no candidate matches.
    pub(crate) fn select(
        &self,
        instance: &Value,
        branches: &[Branch],
        results: &mut ValidationResults,
    ) -> Option<usize> {
        let tag = self.read_tag(instance, results)?;
        if let Some(fragment) = self.mapped_fragment(tag) {
            let found = branches.iter().position(|b| b.fragment.as_deref() == Some(fragment));
            if found.is_none() {
                results.error(format!(
                    "discriminator value '{tag}' maps to '{fragment}', which is not a candidate schema"
                ));
            }
            return found;
        }
        let found = branches.iter().position(|b| b.label.as_deref() == Some(tag));
        if found.is_none() {
            results.error(format!("unmatched discriminator value '{tag}'"));
        }
        found
    }
}

fn normalize_target(compiler: &Compiler<'_>, target: &str) -> String {
    if target.contains('#') {
        compiler.document().canonical_fragment(target)
    } else if target.contains('/') {
        format!("#{target}")
    } else {
        // Bare schema name, the common shorthand.
        format!("#/components/schemas/{target}")
    }
}

/// Standalone `discriminator` keyword (no composition sibling).
pub struct DiscriminatorValidator {
    discriminator: Discriminator,
    context: Arc<ValidationContext>,
}

impl DiscriminatorValidator {
    pub(crate) fn build(
        compiler: &Compiler<'_>,
        keyword_value: &Value,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        Ok(Box::new(Self {
            discriminator: Discriminator::parse(compiler, keyword_value)?,
            context: Arc::clone(compiler.context()),
        }))
    }
}

thread_local! {
    // Dispatch targets currently being evaluated on this thread. Evaluation
    // is synchronous, so re-entering a fragment can only mean the concrete
    // schema referenced back into the parent that dispatched to it.
    static IN_FLIGHT: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

impl KeywordValidator for DiscriminatorValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let Some(tag) = self.discriminator.read_tag(instance, results) else { return };
        let fragment = match self.discriminator.mapped_fragment(tag) {
            Some(fragment) => fragment.to_string(),
            None => format!("#/components/schemas/{tag}"),
        };
        let Ok(target) = self.context.compiled_fragment(&fragment, "discriminator") else {
            results.error(format!("unmatched discriminator value '{tag}'"));
            return;
        };
        let entered = IN_FLIGHT.with(|set| set.borrow_mut().insert(fragment.clone()));
        if !entered {
            return;
        }
        target.validate_into(instance, results);
        IN_FLIGHT.with(|set| {
            set.borrow_mut().remove(&fragment);
        });
    }
}
