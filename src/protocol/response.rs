//! HTTP Response

use bytes::{BufMut, Bytes, BytesMut};

pub const CONTENT_HTML: &str = "text/html; charset=utf-8";
pub const CONTENT_JSON: &str = "application/json";
pub const CONTENT_TEXT: &str = "text/plain; charset=utf-8";

/// Response to an HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
    /// Close the connection after writing
    pub close: bool,
}

impl HttpResponse {
    pub fn new(status: u16, content_type: &str, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            body: body.into(),
            close: false,
        }
    }

    pub fn html(body: String) -> Self {
        Self::new(200, CONTENT_HTML, body)
    }

    pub fn json(body: String) -> Self {
        Self::new(200, CONTENT_JSON, body)
    }

    pub fn text(body: String) -> Self {
        Self::new(200, CONTENT_TEXT, body)
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self::new(
            status,
            CONTENT_JSON,
            format!(r#"{{"error":"{}"}}"#, json_escape(message)),
        )
    }

    pub fn not_found() -> Self {
        Self::error(404, "Not found")
    }

    pub fn method_not_allowed() -> Self {
        Self::error(405, "Method not allowed")
    }

    pub fn bad_request(message: &str) -> Self {
        Self::error(400, message).with_close()
    }

    pub fn with_close(mut self) -> Self {
        self.close = true;
        self
    }

    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }

    /// Serialize status line, headers and body
    pub fn encode(&self, dst: &mut BytesMut) {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: {}\r\n\r\n",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len(),
            if self.close { "close" } else { "keep-alive" }
        );
        dst.reserve(head.len() + self.body.len());
        dst.put_slice(head.as_bytes());
        dst.put_slice(&self.body);
    }
}

/// Escape a string for use inside a JSON string literal
pub fn json_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        let mut buf = BytesMut::new();
        HttpResponse::html("<p>hi</p>".to_string()).encode(&mut buf);
        let text = String::from_utf8(buf.to_vec()).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Length: 9\r\n"));
        assert!(text.contains("Connection: keep-alive\r\n"));
        assert!(text.ends_with("\r\n\r\n<p>hi</p>"));
    }

    #[test]
    fn test_bad_request_closes() {
        let resp = HttpResponse::bad_request("nope");
        assert_eq!(resp.status, 400);
        assert!(resp.close);
        assert_eq!(resp.body, Bytes::from_static(br#"{"error":"nope"}"#));
    }

    #[test]
    fn test_json_escape() {
        assert_eq!(json_escape("a\"b\\c\n"), "a\\\"b\\\\c\\n");
        assert_eq!(json_escape("\u{1}"), "\\u0001");
    }
}
