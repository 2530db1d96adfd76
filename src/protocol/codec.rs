//! HTTP Codec for Tokio
//!
//! Implements Encoder and Decoder traits for framed I/O.

use bytes::BytesMut;
use std::io;
use tokio_util::codec::{Decoder, Encoder};

use super::request::HttpRequest;
use super::response::HttpResponse;

/// Largest accepted request head
pub const MAX_HEAD_SIZE: usize = 16 * 1024;

/// Largest accepted request body
pub const MAX_BODY_SIZE: usize = 64 * 1024;

const HEAD_END: &[u8] = b"\r\n\r\n";

/// Tokio codec for HTTP/1.x requests and responses
#[derive(Debug, Default)]
pub struct HttpCodec {
    /// Current decode state
    state: DecodeState,
}

#[derive(Debug, Default)]
enum DecodeState {
    #[default]
    Head,
    Body(Box<HttpRequest>, usize),
}

impl HttpCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for HttpCodec {
    type Item = HttpRequest;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match &mut self.state {
                DecodeState::Head => {
                    let end = match src.windows(HEAD_END.len()).position(|w| w == HEAD_END) {
                        Some(end) => end,
                        None if src.len() > MAX_HEAD_SIZE => {
                            return Err(io::Error::new(
                                io::ErrorKind::InvalidData,
                                "request head too large",
                            ));
                        }
                        None => return Ok(None),
                    };

                    let head = src.split_to(end + HEAD_END.len());
                    let text = std::str::from_utf8(&head[..end]).map_err(|_| {
                        io::Error::new(io::ErrorKind::InvalidData, "request head is not utf-8")
                    })?;
                    let request = HttpRequest::parse_head(text)?;

                    let body_len = request.content_length()?;
                    if body_len > MAX_BODY_SIZE {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            "request body too large",
                        ));
                    }
                    self.state = DecodeState::Body(Box::new(request), body_len);
                }

                DecodeState::Body(_, body_len) => {
                    let body_len = *body_len;
                    if src.len() < body_len {
                        return Ok(None);
                    }

                    let body = src.split_to(body_len);
                    if let DecodeState::Body(mut request, _) = std::mem::take(&mut self.state) {
                        request.body = body.to_vec();
                        return Ok(Some(*request));
                    }
                }
            }
        }
    }
}

impl Encoder<HttpResponse> for HttpCodec {
    type Error = io::Error;

    fn encode(&mut self, item: HttpResponse, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.encode(dst);
        Ok(())
    }
}
