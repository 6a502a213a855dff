//! Backend that answers every request with a JSON description of it.
//!
//! Useful for checking what the proxy forwards:
//! ```text
//! cargo run --example echo_backend -- 3100
//! route-cli create echo http://127.0.0.1:3100
//! curl -H "Host: <id>.localhost" http://127.0.0.1:3000/some/path?x=1
//! ```

use axum::{body::Bytes, extract::Request, routing::any, Json, Router};
use serde_json::{json, Map, Value};
use std::net::SocketAddr;

async fn echo(request: Request) -> Json<Value> {
    let (parts, body) = request.into_parts();
    let body: Bytes = axum::body::to_bytes(body, 1024 * 1024).await.unwrap_or_default();

    let headers: Map<String, Value> = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            )
        })
        .collect();

    Json(json!({
        "method": parts.method.as_str(),
        "path": parts.uri.path(),
        "query": parts.uri.query(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port = std::env::args()
        .nth(1)
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3100);

    let app = Router::new()
        .route("/", any(echo))
        .route("/{*path}", any(echo));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("Echo backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
