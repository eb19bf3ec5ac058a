//! Synchronous API client core for the kudos favor-exchange service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `KudosClient` is stateless — it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Outbound bodies route through the request-body encoder in [`body`]:
//!   [`body::build_body`] decides JSON vs. multipart from the payload shape
//!   and requested [`body::EncodingMode`], flattens mappings into multipart
//!   field lists, and attaches the matching content-type header.
//! - [`payload::Payload`] is the closed union of everything a body can
//!   hold, including opaque binary attachments at arbitrary depth.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod body;
pub mod client;
pub mod error;
pub mod http;
pub mod payload;
pub mod types;

pub use body::{build_body, resolve_mode, to_form_fields, BodyData, EncodedBody, EncodingMode, WireFormat};
pub use client::KudosClient;
pub use error::ApiError;
pub use http::{HttpBody, HttpMethod, HttpRequest, HttpResponse};
pub use payload::{Attachment, FormField, FormValue, Payload, MAX_DEPTH};
pub use types::{
    CreateFavor, Favor, FavorKind, Handshake, Message, Profile, ProposeHandshake, SendMessage,
    UpdateFavor, UpdateProfile,
};
