//! Transport-level request and response types.
//!
//! A [`Request`] describes a logical API call relative to the client's base
//! URI. The client resolves it into a [`TransportRequest`], hands it to a
//! [`Transport`], and normalizes the [`RawResponse`] into a [`Response`].

pub mod normalize;
mod request;
mod response;
pub mod transport;

pub use request::Request;
pub use response::{Body, Response};
pub use transport::{RawResponse, ReqwestTransport, Transport, TransportError, TransportRequest};
