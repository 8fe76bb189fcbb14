//! Local HTTP stand-in for the catalog API, used by tests that exercise the
//! concrete client end to end.

use crate::config::TmdbConfig;
use crate::http::HttpClient;
use crate::tmdb::TmdbClient;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Canned response, matched by substring against the request line.
#[derive(Clone)]
pub struct Route {
    pub needle: &'static str,
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Route {
    pub fn json(needle: &'static str, body: impl Into<String>) -> Self {
        Self {
            needle,
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(needle: &'static str, body: impl Into<String>, millis: u64) -> Self {
        Self {
            needle,
            status: 200,
            body: body.into(),
            delay: Duration::from_millis(millis),
        }
    }

    pub fn status(needle: &'static str, status: u16) -> Self {
        Self {
            needle,
            status,
            body: "{}".to_string(),
            delay: Duration::ZERO,
        }
    }
}

/// Serves the given routes on an ephemeral port, one connection per request.
/// Unmatched requests get a 404.
pub async fn spawn_catalog(routes: Vec<Route>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                loop {
                    let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    read += n;
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") || read == buf.len() {
                        break;
                    }
                }
                let request = String::from_utf8_lossy(&buf[..read]).into_owned();

                let (status, body, delay) =
                    match routes.iter().find(|r| request.contains(r.needle)) {
                        Some(route) => (route.status, route.body.clone(), route.delay),
                        None => (404, "{}".to_string(), Duration::ZERO),
                    };

                tokio::time::sleep(delay).await;

                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });

    addr
}

/// Client pointed at the local stand-in, with the default locales.
pub fn catalog_client(addr: SocketAddr) -> TmdbClient {
    let config = TmdbConfig {
        api_key: "k".to_string(),
        base_url: Some(format!("http://{}", addr)),
        image_base_url: None,
        language: None,
        fallback_language: None,
    };
    TmdbClient::new(HttpClient::new(), config)
}
