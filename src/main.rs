use routekit::{get, post, redirect_with, sync, ErrorCode, HandlerError, Headers, Response};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    routekit::app([
        get("/hello", sync(|_| "hello world")),
        get(
            "/error",
            sync(|_| Response::status_body(500, "an error has occured")),
        ),
        get(
            "/callName",
            sync(|ctx| {
                let name = ctx.params.get_str("name").unwrap_or("stranger");
                format!("hello {name}")
            }),
        ),
        get(
            "/info",
            sync(|_| {
                let info = json!({
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                });
                Response::status_headers_body(
                    200,
                    Headers::new().with("content-type", "application/json"),
                    info.to_string(),
                )
            }),
        ),
        get("/users/:id", |ctx| async move {
            match ctx.params.get_str("id") {
                Some(id) if id.chars().all(|c| c.is_ascii_digit()) => Ok(format!("user {id}")),
                _ => Err(HandlerError::from(ErrorCode::BadRequest)),
            }
        }),
        get("/old-hello", sync(|_| redirect_with("/hello", 301))),
        post(
            "/echo",
            sync(|ctx| {
                let echoed: serde_json::Map<_, _> = ctx
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect();
                Response::status_headers_body(
                    200,
                    Headers::new().with("content-type", "application/json"),
                    serde_json::Value::Object(echoed).to_string(),
                )
            }),
        ),
    ])?;
    Ok(())
}
