//! Path templates.
//!
//! A contract path like `/pets/{petId}/photos` compiles to an anchored
//! regex with one capture group per template variable. Captures may be
//! empty: whether an empty value is acceptable is the parameter schema's
//! call, not the matcher's.

use percent_encoding::percent_decode_str;
use regex::Regex;

use oasv_core::CompileError;

/// A compiled contract path template.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    template: String,
    matcher: Regex,
    variables: Vec<String>,
}

impl PathTemplate {
    /// Compile a template string.
    ///
    /// # Errors
    ///
    /// [`CompileError::InvalidPattern`] when the template has unbalanced
    /// braces or an empty variable name.
    pub fn parse(template: &str) -> Result<Self, CompileError> {
        let invalid = |reason: &str| CompileError::InvalidPattern {
            pattern: template.to_string(),
            reason: reason.to_string(),
        };

        let mut pattern = String::from("^");
        let mut variables = Vec::new();
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            pattern.push_str(&regex::escape(&rest[..open]));
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| invalid("unclosed '{'"))?;
            let name = &after[..close];
            if name.is_empty() {
                return Err(invalid("empty template variable name"));
            }
            variables.push(name.to_string());
            // A variable spans one path segment and may be empty.
            pattern.push_str("([^/]*)");
            rest = &after[close + 1..];
        }
        if rest.contains('}') {
            return Err(invalid("unmatched '}'"));
        }
        pattern.push_str(&regex::escape(rest));
        pattern.push('$');

        let matcher = Regex::new(&pattern).map_err(|e| CompileError::InvalidPattern {
            pattern: template.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { template: template.to_string(), matcher, variables })
    }

    /// The template string as written in the contract.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Declared variable names, in template order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Match a concrete path, returning percent-decoded `(name, value)`
    /// captures in template order, or `None` when the path does not match.
    pub fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let captured = self.matcher.captures(path)?;
        Some(
            self.variables
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let raw = captured.get(i + 1).map_or("", |m| m.as_str());
                    (name.clone(), percent_decode(raw))
                })
                .collect(),
        )
    }
}

/// Reduce a request target to its path: strip any scheme and authority,
/// then cut the query and fragment.
pub(crate) fn request_path(target: &str) -> &str {
    let path = match target.find("://") {
        Some(scheme_end) => {
            let authority = &target[scheme_end + 3..];
            match authority.find('/') {
                Some(slash) => &authority[slash..],
                None => "/",
            }
        }
        None => target,
    };
    let path = path.split('?').next().unwrap_or(path);
    path.split('#').next().unwrap_or(path)
}

pub(crate) fn percent_decode(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
