//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use subdomain_proxy::config::ProxyConfig;
use subdomain_proxy::http::HttpServer;
use subdomain_proxy::lifecycle::Shutdown;
use subdomain_proxy::store::{MemoryRouteStore, RouteStore};

pub const PROXY_DOMAIN: &str = "proxy.test";

async fn bind_ephemeral() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        201 => "201 Created",
        302 => "302 Found",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// Read the request head plus a `content-length` body, if any.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let mut expected: Option<usize> = None;
    loop {
        if expected.is_none() {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                expected = Some(pos + 4 + body_len);
            }
        }
        if matches!(expected, Some(total) if buf.len() >= total) {
            break;
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Start a backend that answers every request with `raw` verbatim.
pub async fn start_raw_backend(raw: String) -> SocketAddr {
    let (listener, addr) = bind_ephemeral().await;
    let raw = Arc::new(raw);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let raw = raw.clone();
            tokio::spawn(async move {
                let _ = read_request(&mut socket).await;
                let _ = socket.write_all(raw.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// Start a simple mock backend that returns a fixed 200 response.
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    start_raw_backend(format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.len(),
        response
    ))
    .await
}

/// Start a programmable mock backend with async support.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let (listener, addr) = bind_ephemeral().await;
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let _ = read_request(&mut socket).await;
                let (status, body) = f().await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    reason(status),
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// Start a backend that returns the received request as its body.
pub async fn start_echo_backend() -> SocketAddr {
    let (listener, addr) = bind_ephemeral().await;

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let request = read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\nX-Backend: echo\r\n\r\n{}",
                    request.len(),
                    request
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// Start a backend that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let (listener, addr) = bind_ephemeral().await;

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = read_request(&mut socket).await;
                tokio::time::sleep(Duration::from_secs(120)).await;
                drop(socket);
            });
        }
    });
    addr
}

/// An address nothing is listening on.
pub async fn refused_addr() -> SocketAddr {
    let (listener, addr) = bind_ephemeral().await;
    drop(listener);
    addr
}

/// A running proxy with both listeners on ephemeral ports.
pub struct TestProxy {
    pub proxy_addr: SocketAddr,
    pub admin_addr: SocketAddr,
    pub store: Arc<dyn RouteStore>,
    pub shutdown: Shutdown,
}

impl TestProxy {
    pub fn proxy_url(&self, path: &str) -> String {
        format!("http://{}{}", self.proxy_addr, path)
    }

    pub fn admin_url(&self, path: &str) -> String {
        format!("http://{}{}", self.admin_addr, path)
    }

    /// Host header selecting the route with `id`.
    pub fn host_for(id: &str) -> String {
        format!("{}.{}", id, PROXY_DOMAIN)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Default configuration for tests: subdomain mode under [`PROXY_DOMAIN`].
pub fn test_config() -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.routing.proxy_domain = PROXY_DOMAIN.to_string();
    config
}

/// Start a proxy over an in-memory store.
pub async fn start_proxy(config: ProxyConfig) -> TestProxy {
    start_proxy_with_store(config, Arc::new(MemoryRouteStore::new())).await
}

/// Start a proxy over the given store.
pub async fn start_proxy_with_store(config: ProxyConfig, store: Arc<dyn RouteStore>) -> TestProxy {
    let (listener, proxy_addr) = bind_ephemeral().await;
    let (admin_listener, admin_addr) = bind_ephemeral().await;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, store.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, Some(admin_listener), server_shutdown).await;
    });

    // Give the initial route load a moment to finish.
    tokio::time::sleep(Duration::from_millis(100)).await;

    TestProxy {
        proxy_addr,
        admin_addr,
        store,
        shutdown,
    }
}

/// HTTP client that never pools or uses system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Register a route through the admin API and return its id.
pub async fn create_route(proxy: &TestProxy, name: &str, url: &str) -> String {
    let res = client()
        .post(proxy.admin_url("/route"))
        .json(&serde_json::json!({ "name": name, "url": url }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201, "route creation failed");
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}
