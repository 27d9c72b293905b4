//! # Contract Document Arena
//!
//! A [`Document`] owns the parsed OpenAPI contract as a value tree and
//! resolves `#/...` fragment references through it. It is the only reference
//! resolution mechanism in the stack: validators address schemas by stable
//! fragment pointers instead of chasing live object references, which keeps
//! cycle detection deterministic.
//!
//! Parsing the contract *text* is the caller's concern; the loaders here are
//! thin `serde_json`/`serde_yaml` conveniences used by callers and tests.

use serde_json::Value;

use crate::error::CompileError;

/// A parsed contract document plus the base URI used as its resolution scope.
///
/// ## Thread Safety
///
/// Immutable after construction; share it with `Arc<Document>`.
#[derive(Debug, Clone)]
pub struct Document {
    root: Value,
    base_uri: String,
}

impl Document {
    /// Wrap an already-parsed value tree.
    pub fn new(root: Value, base_uri: impl Into<String>) -> Self {
        Self { root, base_uri: base_uri.into() }
    }

    /// Parse a JSON contract.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidDocument`] if the text is not JSON.
    pub fn from_json(text: &str, base_uri: impl Into<String>) -> Result<Self, CompileError> {
        let root = serde_json::from_str(text)
            .map_err(|e| CompileError::InvalidDocument { reason: e.to_string() })?;
        Ok(Self::new(root, base_uri))
    }

    /// Parse a YAML contract into the same value representation.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidDocument`] if the text is not YAML or
    /// contains constructs with no JSON equivalent (non-string keys).
    pub fn from_yaml(text: &str, base_uri: impl Into<String>) -> Result<Self, CompileError> {
        let root: Value = serde_yaml::from_str(text)
            .map_err(|e| CompileError::InvalidDocument { reason: e.to_string() })?;
        Ok(Self::new(root, base_uri))
    }

    /// The document root.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The base URI this document resolves relative references against.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Resolve a reference string to a node within this document.
    ///
    /// Accepts `#/a/b`, a full `<base>#/a/b` form, or a bare `#` / empty
    /// fragment meaning the root. Pointer tokens are unescaped per RFC 6901
    /// (`~1` is `/`, `~0` is `~`).
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnresolvedReference`] if the fragment does not
    /// address an existing node, or if the reference targets a different
    /// document (external references are out of scope).
    pub fn resolve<'a>(
        &'a self,
        reference: &str,
        location: &str,
    ) -> Result<&'a Value, CompileError> {
        let unresolved = || CompileError::UnresolvedReference {
            reference: reference.to_string(),
            location: location.to_string(),
        };

        let fragment = match reference.split_once('#') {
            Some((base, fragment)) => {
                if !base.is_empty() && base != self.base_uri {
                    return Err(unresolved());
                }
                fragment
            }
            // No '#': a bare document reference is external, reject it.
            None => return Err(unresolved()),
        };

        let mut node = &self.root;
        for token in fragment.split('/').filter(|t| !t.is_empty()) {
            let token = token.replace("~1", "/").replace("~0", "~");
            node = match node {
                Value::Object(map) => map.get(&token).ok_or_else(unresolved)?,
                Value::Array(items) => {
                    let idx: usize = token.parse().map_err(|_| unresolved())?;
                    items.get(idx).ok_or_else(unresolved)?
                }
                _ => return Err(unresolved()),
            };
        }
        Ok(node)
    }

    /// Canonical form of a reference for memoization keys: the fragment part
    /// with the base URI stripped, so `#/a` and `<base>#/a` coincide.
    pub fn canonical_fragment(&self, reference: &str) -> String {
        match reference.split_once('#') {
            Some((_, fragment)) => format!("#{fragment}"),
            None => reference.to_string(),
        }
    }
}
