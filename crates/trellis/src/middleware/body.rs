//! Request body parsing.

use tracing::warn;

use super::{BoxFuture, Flow, Middleware, Query};
use crate::config::ServerConfig;
use crate::context::{keys, Context};
use crate::request::{Method, Request};
use crate::response::Response;

/// A file part of a `multipart/form-data` body, stored under [`keys::FILES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Form field name.
    pub field: String,
    /// File name sent by the client.
    pub file_name: String,
    /// Declared media type of the part, if any.
    pub content_type: Option<String>,
    /// Raw file contents.
    pub data: Vec<u8>,
}

/// Decodes the request body into the context.
///
/// GET and HEAD requests are skipped. Depending on the media type:
///
/// | Content-Type                        | keys set                            |
/// |-------------------------------------|-------------------------------------|
/// | `application/json`                  | `body`, `body_json` or `body_error` |
/// | `application/x-www-form-urlencoded` | `body`, `form`                      |
/// | `multipart/form-data`               | `form`, `files` or `body_error`     |
/// | anything else                       | `body`                              |
///
/// Multipart bodies are not copied into `body`: text parts land in `form`,
/// file parts in `files`. Bodies larger than the limit are left alone and
/// `body_error` says so.
#[derive(Debug, Clone, Copy)]
pub struct BodyParser {
    limit: usize,
}

impl BodyParser {
    /// Creates a body parser inspecting at most `limit` bytes.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Creates a body parser using the configured limit.
    #[must_use]
    pub const fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.body_limit)
    }

    async fn parse(&self, req: &Request, ctx: &mut Context) {
        if matches!(req.method, Method::Get | Method::Head) {
            return;
        }

        if req.body.len() > self.limit {
            warn!(
                path = %req.path,
                size = req.body.len(),
                limit = self.limit,
                "Request body exceeds limit"
            );
            ctx.set(
                keys::BODY_ERROR,
                format!("body of {} bytes exceeds limit of {}", req.body.len(), self.limit),
            );
            return;
        }

        match media_type(req).as_deref() {
            Some("application/json") => {
                match serde_json::from_slice::<serde_json::Value>(&req.body) {
                    Ok(json) => ctx.set(keys::BODY_JSON, json),
                    Err(e) => {
                        warn!(path = %req.path, error = %e, "Failed to parse JSON body");
                        ctx.set(keys::BODY_ERROR, e.to_string());
                    }
                }
            }
            Some("application/x-www-form-urlencoded") => {
                ctx.set(keys::FORM, Query::parse(&String::from_utf8_lossy(&req.body)));
            }
            Some("multipart/form-data") => {
                match parse_multipart(req).await {
                    Ok((form, files)) => {
                        ctx.set(keys::FORM, form);
                        ctx.set(keys::FILES, files);
                    }
                    Err(e) => {
                        warn!(path = %req.path, error = %e, "Failed to parse multipart body");
                        ctx.set(keys::BODY_ERROR, e.to_string());
                    }
                }
                return;
            }
            _ => {}
        }

        ctx.set(keys::BODY, String::from_utf8_lossy(&req.body).into_owned());
    }
}

impl Default for BodyParser {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

/// Lowercased media type of the request, without parameters.
fn media_type(req: &Request) -> Option<String> {
    let value = req.get_header("Content-Type")?;
    let essence = value.split(';').next().unwrap_or(value).trim();
    Some(essence.to_ascii_lowercase())
}

/// Splits a multipart body into text fields and file uploads.
async fn parse_multipart(req: &Request) -> multer::Result<(Query, Vec<Upload>)> {
    let boundary = multer::parse_boundary(req.get_header("Content-Type").unwrap_or_default())?;
    let body = req.body.clone();
    let stream = futures::stream::once(std::future::ready(Ok::<_, std::io::Error>(body)));
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = Query::default();
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(ToString::to_string);
                let data = field.bytes().await?.to_vec();
                files.push(Upload {
                    field: name,
                    file_name,
                    content_type,
                    data,
                });
            }
            None => form.append(name, field.text().await?),
        }
    }

    Ok((form, files))
}

impl Middleware for BodyParser {
    fn call<'a>(
        &'a self,
        _res: &'a mut Response,
        req: &'a Request,
        ctx: &'a mut Context,
    ) -> BoxFuture<'a, Flow> {
        Box::pin(async move {
            self.parse(req, ctx).await;
            Flow::Continue
        })
    }
}
