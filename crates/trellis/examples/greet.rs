//! Runs a few requests through a small route table and prints the answers.
//!
//! ```text
//! cargo run -p trellis --example greet
//! ```

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use trellis::middleware::{from_fn, Flow, QueryParser, RequestLogger};
use trellis::{Request, Router, Server};

#[tokio::main]
async fn main() -> trellis::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let router = Router::new();
    router.get(
        "/greet/:first/:last",
        from_fn(|res, _, ctx| {
            let params = ctx.params().cloned().unwrap_or_default();
            let greeting = ctx
                .query()
                .and_then(|q| q.get("greeting"))
                .unwrap_or("Hello");
            res.write(format!(
                "{greeting} {} {}",
                params.get("first"),
                params.get("last")
            ));
            Flow::Handled
        }),
    )?;

    let server = Server::new()
        .middleware(RequestLogger)
        .middleware(QueryParser)
        .middleware(router.clone());

    for path in ["/greet/Jane/Doe", "/greet/Jane/Doe/?greeting=Hi", "/nowhere"] {
        let res = server.handle(Request::get(path)).await;
        info!(
            path,
            status = res.status,
            body = %res.body_string().unwrap_or_default(),
            "Response"
        );
    }

    router.add("*", "/ping", from_fn(|res, _, _| {
        res.write("pong");
        Flow::Handled
    }))?;
    let res = server.handle(Request::get("/ping")).await;
    info!(status = res.status, body = %res.body_string().unwrap_or_default(), "Response");

    Ok(())
}
