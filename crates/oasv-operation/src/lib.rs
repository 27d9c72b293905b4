//! # oasv-operation
//!
//! HTTP operation validation against an OpenAPI v3 contract, layered on the
//! `oasv-schema` keyword engine.
//!
//! ## What lives here
//!
//! - [`Request`] / [`Response`]: transport-agnostic message shapes with
//!   builders, normalized header/query/cookie access and a lazily-decoded
//!   [`Body`].
//! - [`PathTemplate`]: contract path templates compiled to anchored
//!   matchers.
//! - [`ParameterValidator`]: raw-string coercion plus schema validation for
//!   path, query, header and cookie parameters.
//! - [`OperationValidator`]: one compiled operation with facet entry points
//!   for each message part, request and response body policies, and
//!   response-status selection.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use oasv_core::{Document, ValidationData};
//! use oasv_operation::{Method, OperationValidator, Request};
//!
//! # fn run() -> Result<(), oasv_core::CompileError> {
//! let document = Arc::new(Document::from_yaml(
//!     &std::fs::read_to_string("contract.yaml").map_err(|e| {
//!         oasv_core::CompileError::InvalidDocument { reason: e.to_string() }
//!     })?,
//!     "file://contract.yaml",
//! )?);
//! let validator = OperationValidator::by_operation_id(&document, "getPet")?;
//!
//! let request = Request::builder("/pets/42?verbose=true", Method::Get).build();
//! let mut data: ValidationData = ValidationData::new();
//! validator.validate_request(&request, &mut data);
//! assert!(data.is_valid(), "{}", data.results());
//! # Ok(())
//! # }
//! ```

mod body;
mod content;
mod operation;
mod parameter;
mod path;
mod request;

pub use body::{Body, BodyDecodeError};
pub use content::MediaType;
pub use operation::{BodyPolicy, OperationValidator};
pub use parameter::{parameter_for_document, Location, ParameterValidator};
pub use path::PathTemplate;
pub use request::{Method, Request, RequestBuilder, Response, ResponseBuilder};
