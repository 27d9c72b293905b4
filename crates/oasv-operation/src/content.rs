//! Media-type parsing and matching for content negotiation.
//!
//! A contract's `content` map keys may carry wildcards (`*/*`, `image/*`);
//! the concrete `Content-Type` header on a message never does. Matching
//! compares type and subtype case-insensitively and ranks candidates by
//! specificity so `application/json` beats `application/*` beats `*/*`.

use std::fmt;

/// A parsed media type: lowercased type/subtype plus the optional
/// `charset` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    kind: String,
    subtype: String,
    charset: Option<String>,
}

impl MediaType {
    /// Parse a `Content-Type` value or a `content` map key.
    ///
    /// Returns `None` when the essence is not a `type/subtype` pair.
    /// Parameters other than `charset` are ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split(';');
        let essence = parts.next()?.trim();
        let (kind, subtype) = essence.split_once('/')?;
        let kind = kind.trim();
        let subtype = subtype.trim();
        if kind.is_empty() || subtype.is_empty() {
            return None;
        }
        let mut charset = None;
        for parameter in parts {
            if let Some((key, value)) = parameter.split_once('=') {
                if key.trim().eq_ignore_ascii_case("charset") {
                    charset = Some(value.trim().trim_matches('"').to_ascii_lowercase());
                }
            }
        }
        Some(Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            charset,
        })
    }

    /// `type/subtype` without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.kind, self.subtype)
    }

    /// The lowercased `charset` parameter, when one was given.
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// True when the payload parses as JSON: `application/json` and any
    /// `+json` structured suffix.
    pub fn is_json(&self) -> bool {
        self.subtype == "json" || self.subtype.ends_with("+json")
    }

    /// True for the `text/*` family.
    pub fn is_text(&self) -> bool {
        self.kind == "text"
    }

    /// True when `self` (a declared, possibly wildcarded media range)
    /// accepts `actual` (a concrete media type).
    pub fn accepts(&self, actual: &MediaType) -> bool {
        (self.kind == "*" || self.kind == actual.kind)
            && (self.subtype == "*" || self.subtype == actual.subtype)
    }

    /// Match rank for candidate selection: exact 2, `type/*` 1, `*/*` 0.
    pub fn specificity(&self) -> u8 {
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", _) => 0,
            (_, "*") => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)?;
        if let Some(charset) = &self.charset {
            write!(f, "; charset={charset}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_essence_and_charset() {
        let mt = MediaType::parse("Application/JSON; Charset=\"UTF-8\"").unwrap();
        assert_eq!(mt.essence(), "application/json");
        assert_eq!(mt.charset(), Some("utf-8"));
        assert!(mt.is_json());
    }

    #[test]
    fn test_parse_rejects_non_pairs() {
        assert!(MediaType::parse("foo").is_none());
        assert!(MediaType::parse("/json").is_none());
        assert!(MediaType::parse("text/").is_none());
        assert!(MediaType::parse("").is_none());
    }

    #[test]
    fn test_structured_suffix_is_json() {
        assert!(MediaType::parse("application/hal+json").unwrap().is_json());
        assert!(!MediaType::parse("application/xml").unwrap().is_json());
        assert!(MediaType::parse("text/plain").unwrap().is_text());
    }

    #[test]
    fn test_wildcard_matching_and_specificity() {
        let json = MediaType::parse("application/json").unwrap();
        let any_app = MediaType::parse("application/*").unwrap();
        let any = MediaType::parse("*/*").unwrap();
        assert!(json.accepts(&json));
        assert!(any_app.accepts(&json));
        assert!(any.accepts(&json));
        assert!(!any_app.accepts(&MediaType::parse("text/plain").unwrap()));
        assert!(json.specificity() > any_app.specificity());
        assert!(any_app.specificity() > any.specificity());
    }
}
