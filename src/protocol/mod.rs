//! HTTP Protocol
//!
//! Minimal HTTP/1.1 subset for the web front end: request parsing, response
//! serialization and a Tokio codec tying them to a TCP stream.

mod codec;
mod request;
mod response;

pub use codec::{HttpCodec, MAX_BODY_SIZE, MAX_HEAD_SIZE};
pub use request::{url_decode, HttpRequest};
pub use response::{json_escape, HttpResponse, CONTENT_HTML, CONTENT_JSON, CONTENT_TEXT};
