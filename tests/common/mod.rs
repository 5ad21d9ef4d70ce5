//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use rewrite_headers::config::{ProxyConfig, Rewrite};
use rewrite_headers::http::HttpServer;
use rewrite_headers::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Start a mock backend that answers every request with `status`, the given
/// headers (in order, repeats allowed) and `body`.
pub async fn start_mock_backend(
    status: &'static str,
    headers: Vec<(&'static str, &'static str)>,
    body: &'static str,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let headers = headers.clone();
                    tokio::spawn(async move {
                        read_request_head(&mut socket).await;

                        let mut response = format!("HTTP/1.1 {}\r\n", status);
                        for (name, value) in &headers {
                            response.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        response.push_str(&format!(
                            "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        ));

                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request_head(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

/// Build a config pointing at `upstream` with the given rewrite rules.
pub fn proxy_config(upstream: SocketAddr, rules: &[(&str, &str, &str)]) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.address = upstream.to_string();
    config.rewrite.name = "test".to_string();
    config.rewrite.config.rewrites = rules
        .iter()
        .map(|(header, regex, replacement)| Rewrite {
            header: header.to_string(),
            regex: regex.to_string(),
            replacement: replacement.to_string(),
        })
        .collect();
    config
}

/// Start the proxy on an ephemeral port and return its address.
pub async fn start_proxy(config: ProxyConfig, shutdown: &Shutdown) -> SocketAddr {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
