#![allow(dead_code)]

use trellis::middleware::{from_fn, Flow, Middleware};
use trellis::{Response, Server, ServerConfig};

pub const NOT_FOUND_PAGE: &str = "<h1>Error 404: Not Found</h1><br /><br />The page or resource \
                                  requested could not be found. If this was a link or worked \
                                  previously, please notify your webmaster.";

/// A handler that writes `text` and stops the chain.
pub fn text(text: &'static str) -> impl Middleware {
    from_fn(move |res, _, _| {
        res.write(text);
        Flow::Handled
    })
}

/// A handler that writes `name=value` for each listed parameter.
pub fn echo_params(names: &'static [&'static str]) -> impl Middleware {
    from_fn(move |res, _, ctx| {
        let params = ctx.params().cloned().unwrap_or_default();
        let parts: Vec<String> = names
            .iter()
            .map(|name| format!("{name}={}", params.get(name)))
            .collect();
        res.write(parts.join("&"));
        Flow::Handled
    })
}

/// A server that does not log unhandled requests.
pub fn quiet_server() -> Server {
    Server::with_config(ServerConfig {
        log_unhandled: false,
        ..ServerConfig::default()
    })
}

pub fn body(res: &Response) -> String {
    res.body_string()
        .unwrap_or_else(|| panic!("Response body is not UTF-8: {:?}", res.body))
}
