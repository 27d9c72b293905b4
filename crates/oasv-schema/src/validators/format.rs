//! `format` keyword. The OpenAPI-profile formats are checked; anything else
//! is annotation-only and passes. Per the validation policy a type-mismatched
//! instance (a number against a string format, a string against `int32`) is
//! reported instead of silently passing.

use base64::Engine as _;
use serde_json::Value;

use oasv_core::{value, ValidationResults};

use crate::validators::KeywordValidator;

#[derive(Debug, Clone, PartialEq, Eq)]
enum FormatKind {
    DateTime,
    Date,
    Email,
    Hostname,
    Ipv4,
    Ipv6,
    Uri,
    Uuid,
    Byte,
    Binary,
    Int32,
    Int64,
    Float,
    Double,
}

pub struct FormatValidator {
    name: String,
    kind: Option<FormatKind>,
}

impl FormatValidator {
    pub(crate) fn build(keyword_value: &Value) -> Box<dyn KeywordValidator> {
        let name = keyword_value.as_str().unwrap_or_default().to_string();
        let kind = match name.as_str() {
            "date-time" => Some(FormatKind::DateTime),
            "date" => Some(FormatKind::Date),
            "email" => Some(FormatKind::Email),
            "hostname" => Some(FormatKind::Hostname),
            "ipv4" => Some(FormatKind::Ipv4),
            "ipv6" => Some(FormatKind::Ipv6),
            "uri" => Some(FormatKind::Uri),
            "uuid" => Some(FormatKind::Uuid),
            "byte" => Some(FormatKind::Byte),
            "binary" => Some(FormatKind::Binary),
            "int32" => Some(FormatKind::Int32),
            "int64" => Some(FormatKind::Int64),
            "float" => Some(FormatKind::Float),
            "double" => Some(FormatKind::Double),
            _ => None,
        };
        Box::new(Self { name, kind })
    }

    fn check_string(&self, kind: &FormatKind, s: &str) -> bool {
        match kind {
            FormatKind::DateTime => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
            FormatKind::Date => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
            FormatKind::Email => is_email(s),
            FormatKind::Hostname => is_hostname(s),
            FormatKind::Ipv4 => s.parse::<std::net::Ipv4Addr>().is_ok(),
            FormatKind::Ipv6 => s.parse::<std::net::Ipv6Addr>().is_ok(),
            FormatKind::Uri => url::Url::parse(s).is_ok(),
            FormatKind::Uuid => uuid::Uuid::parse_str(s).is_ok(),
            FormatKind::Byte => base64::engine::general_purpose::STANDARD.decode(s).is_ok(),
            FormatKind::Binary => true,
            _ => false,
        }
    }
}

impl KeywordValidator for FormatValidator {
    fn validate(&self, instance: &Value, results: &mut ValidationResults) {
        let Some(kind) = &self.kind else { return };
        match kind {
            FormatKind::Int32 | FormatKind::Int64 | FormatKind::Float | FormatKind::Double => {
                let Some(n) = instance.as_f64() else {
                    results.error(format!(
                        "format '{}' expects a number, found '{}'",
                        self.name,
                        value::type_name(instance)
                    ));
                    return;
                };
                let ok = match kind {
                    FormatKind::Int32 => {
                        value::is_integral(instance)
                            && n >= f64::from(i32::MIN)
                            && n <= f64::from(i32::MAX)
                    }
                    FormatKind::Int64 => value::is_integral(instance),
                    _ => true,
                };
                if !ok {
                    results.error(format!("value {n} does not satisfy format '{}'", self.name));
                }
            }
            string_kind => {
                let Value::String(s) = instance else {
                    results.error(format!(
                        "format '{}' expects a string, found '{}'",
                        self.name,
                        value::type_name(instance)
                    ));
                    return;
                };
                if !self.check_string(string_kind, s) {
                    results.error(format!("'{s}' is not a valid '{}' value", self.name));
                }
            }
        }
    }
}

fn is_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !s.chars().any(char::is_whitespace)
                && !domain.contains('@')
        }
        None => false,
    }
}

fn is_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }
    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

#[cfg(test)]
mod tests {
    use crate::schema::SchemaValidator;
    use oasv_core::{Document, ValidationData};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn check(schema: Value, value: Value, expect_valid: bool) {
        let document = Arc::new(Document::new(schema.clone(), "mem://t"));
        let v = SchemaValidator::for_document(document, "t", &schema).unwrap();
        let mut data: ValidationData = ValidationData::new();
        v.validate(&value, &mut data);
        assert_eq!(data.is_valid(), expect_valid, "{value}: {}", data.results());
    }

    #[test]
    fn test_date_time() {
        let schema = json!({"format": "date-time"});
        check(schema.clone(), json!("1996-12-19T16:39:57-08:00"), true);
        check(schema.clone(), json!("2024-01-01T00:00:00Z"), true);
        check(schema.clone(), json!("1996-12-19"), false);
        check(schema, json!(42), false);
    }

    #[test]
    fn test_date() {
        check(json!({"format": "date"}), json!("2024-02-29"), true);
        check(json!({"format": "date"}), json!("2023-02-29"), false);
    }

    #[test]
    fn test_email_and_hostname() {
        check(json!({"format": "email"}), json!("a@b.co"), true);
        check(json!({"format": "email"}), json!("not-an-email"), false);
        check(json!({"format": "hostname"}), json!("api.example.com"), true);
        check(json!({"format": "hostname"}), json!("-bad-.example"), false);
    }

    #[test]
    fn test_ip_addresses() {
        check(json!({"format": "ipv4"}), json!("192.168.0.1"), true);
        check(json!({"format": "ipv4"}), json!("192.168.0"), false);
        check(json!({"format": "ipv6"}), json!("::1"), true);
        check(json!({"format": "ipv6"}), json!("zz::1"), false);
    }

    #[test]
    fn test_uri_uuid_byte() {
        check(json!({"format": "uri"}), json!("https://example.com/x"), true);
        check(json!({"format": "uri"}), json!("not a uri"), false);
        check(
            json!({"format": "uuid"}),
            json!("123e4567-e89b-12d3-a456-426614174000"),
            true,
        );
        check(json!({"format": "uuid"}), json!("123e4567"), false);
        check(json!({"format": "byte"}), json!("aGVsbG8="), true);
        check(json!({"format": "byte"}), json!("@@@"), false);
    }

    #[test]
    fn test_numeric_formats() {
        check(json!({"format": "int32"}), json!(1), true);
        check(json!({"format": "int32"}), json!(3_000_000_000u64), false);
        check(json!({"format": "int32"}), json!("1"), false);
        check(json!({"format": "int64"}), json!(3_000_000_000u64), true);
        check(json!({"format": "int64"}), json!(1.5), false);
        check(json!({"format": "double"}), json!(0.1), true);
    }

    #[test]
    fn test_unknown_format_is_annotation_only() {
        check(json!({"format": "no-such-format"}), json!("anything"), true);
        check(json!({"format": "no-such-format"}), json!(17), true);
    }
}
