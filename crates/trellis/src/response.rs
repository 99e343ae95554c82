//! HTTP response type, used as the response sink of a dispatch.

use std::collections::HashMap;

/// An HTTP response being written by the middleware chain.
///
/// The HTTP engine hands the finished value to the client once dispatch
/// returns.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a new response with the given status.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a 200 OK response.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Creates a response with plain text content.
    pub fn text(body: impl Into<String>) -> Self {
        let body: String = body.into();
        Self::ok()
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
    }

    /// Creates one of the built-in HTML error pages.
    ///
    /// 404 and 500 have fixed pages; any other status gets a bare heading.
    #[must_use]
    pub fn error_page(status: u16) -> Self {
        let mut res = Self::new(status);
        res.write_error_page(status, false);
        res
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(key, value);
        self
    }

    /// Sets the status code.
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the status code in place.
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Sets a header in place, replacing any value under the same name.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value.into());
    }

    /// Gets a header value, ignoring name case.
    #[must_use]
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Appends bytes to the body.
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) {
        self.body.extend_from_slice(bytes.as_ref());
    }

    /// Writes an HTML error page: status, `Content-Type: text/html`,
    /// `Content-Length` and, unless `head_only`, the page itself.
    ///
    /// `Content-Length` always describes the full page so a HEAD answer
    /// carries the same headers as the matching GET.
    pub fn write_error_page(&mut self, status: u16, head_only: bool) {
        let page = error_page_body(status);

        self.status = status;
        self.set_header("Content-Type", "text/html");
        self.set_header("Content-Length", page.len().to_string());
        self.body.clear();
        if !head_only {
            self.body.extend_from_slice(page.as_bytes());
        }
    }

    /// Returns the body as a string.
    #[must_use]
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Returns the status text for the current status code.
    #[must_use]
    pub const fn status_text(&self) -> &'static str {
        status_text(self.status)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

const fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn error_page_body(status: u16) -> String {
    match status {
        404 => "<h1>Error 404: Not Found</h1><br /><br />The page or resource requested \
                could not be found. If this was a link or worked previously, please notify \
                your webmaster."
            .to_string(),
        500 => "<h1>Error 500: Internal Server Error</h1><br /><br />An internal server \
                error prevented execution of this request. Please notify the webmaster."
            .to_string(),
        other => format!("<h1>Error {other}: {}</h1>", status_text(other)),
    }
}
