//! # Message Bodies
//!
//! [`Body`] carries a request or response payload from any of four sources:
//! an already-parsed value tree, a string, raw bytes, or a one-shot byte
//! stream. Decoding into a value tree happens lazily against the effective
//! media type and the result is cached, so a body consulted by several
//! checks decodes once. A stream source is drained into bytes on first
//! decode, which keeps later decodes (under a different media type, or a
//! repeated run) possible.

use std::io::Read;
use std::sync::Mutex;

use serde_json::Value;
use thiserror::Error;

use crate::content::MediaType;

/// Failure to turn the raw payload into a value tree.
///
/// These surface as evaluation findings at the operation layer, not as
/// construction errors: a malformed payload is the message's fault, never
/// the contract's.
#[derive(Debug, Error)]
pub enum BodyDecodeError {
    /// Reading the underlying stream failed.
    #[error("failed to read body stream: {0}")]
    Io(#[from] std::io::Error),
    /// The payload is not valid JSON.
    #[error("body is not valid JSON: {reason}")]
    Json { reason: String },
    /// A textual media type with a payload that is not UTF-8.
    #[error("body is not valid UTF-8 text")]
    NotUtf8,
}

enum Source {
    Structured(Value),
    Text(String),
    Bytes(Vec<u8>),
    Stream(Box<dyn Read + Send>),
    /// Transient placeholder while a stream is being drained.
    Draining,
}

struct Inner {
    source: Source,
    /// Last decode, keyed by media-type essence.
    cache: Option<(String, Value)>,
}

/// A lazily-decoded message payload.
///
/// ## Concurrency
///
/// Interior state (stream draining, decode cache) sits behind a mutex, so a
/// shared `Body` is safe to consult from concurrent validations.
pub struct Body {
    inner: Mutex<Inner>,
}

impl Body {
    fn from_source(source: Source) -> Self {
        Self { inner: Mutex::new(Inner { source, cache: None }) }
    }

    /// Body from an already-parsed value tree. Decoding is the identity.
    pub fn from_value(value: Value) -> Self {
        Self::from_source(Source::Structured(value))
    }

    /// Body from payload text.
    pub fn from_string(text: impl Into<String>) -> Self {
        Self::from_source(Source::Text(text.into()))
    }

    /// Body from raw payload bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::from_source(Source::Bytes(bytes))
    }

    /// Body from a one-shot byte stream. The stream is drained on first
    /// decode and retained as bytes afterwards.
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self::from_source(Source::Stream(Box::new(reader)))
    }

    /// Decode the payload against `media_type`.
    ///
    /// JSON-family types parse the payload as JSON; `text/*` yields a string
    /// value. The decoded tree is cached per media-type essence, so repeated
    /// decodes are cheap and a stream source survives them.
    ///
    /// # Errors
    ///
    /// [`BodyDecodeError`] when the payload cannot be read or does not parse
    /// under the given media type.
    pub fn decode(&self, media_type: &MediaType) -> Result<Value, BodyDecodeError> {
        let essence = media_type.essence();
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some((cached_essence, value)) = &inner.cache {
            if *cached_essence == essence {
                return Ok(value.clone());
            }
        }

        if let Source::Stream(_) = inner.source {
            let Source::Stream(mut reader) =
                std::mem::replace(&mut inner.source, Source::Draining)
            else {
                unreachable!()
            };
            let mut bytes = Vec::new();
            match reader.read_to_end(&mut bytes) {
                Ok(_) => inner.source = Source::Bytes(bytes),
                Err(e) => {
                    // Stream is spent; later decodes see an empty payload.
                    inner.source = Source::Bytes(Vec::new());
                    return Err(e.into());
                }
            }
        }

        let value = match &inner.source {
            Source::Structured(value) => value.clone(),
            Source::Text(text) => decode_text(text, media_type)?,
            Source::Bytes(bytes) => decode_bytes(bytes, media_type)?,
            Source::Stream(_) | Source::Draining => unreachable!(),
        };

        inner.cache = Some((essence, value.clone()));
        Ok(value)
    }
}

fn decode_text(text: &str, media_type: &MediaType) -> Result<Value, BodyDecodeError> {
    if media_type.is_json() {
        serde_json::from_str(text).map_err(|e| BodyDecodeError::Json { reason: e.to_string() })
    } else {
        Ok(Value::String(text.to_string()))
    }
}

fn decode_bytes(bytes: &[u8], media_type: &MediaType) -> Result<Value, BodyDecodeError> {
    if media_type.is_json() {
        serde_json::from_slice(bytes).map_err(|e| BodyDecodeError::Json { reason: e.to_string() })
    } else {
        let text = std::str::from_utf8(bytes).map_err(|_| BodyDecodeError::NotUtf8)?;
        Ok(Value::String(text.to_string()))
    }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let source = match &inner.source {
            Source::Structured(_) => "structured",
            Source::Text(_) => "text",
            Source::Bytes(_) => "bytes",
            Source::Stream(_) => "stream",
            Source::Draining => "draining",
        };
        f.debug_struct("Body")
            .field("source", &source)
            .field("decoded", &inner.cache.is_some())
            .finish()
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::from_string(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::from_string(text)
    }
}
