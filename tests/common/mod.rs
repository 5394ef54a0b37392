//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use tx_broadcast_proxy::config::ProxyConfig;
use tx_broadcast_proxy::{HttpServer, Shutdown};

/// Start a programmable mock backend on an ephemeral port.
///
/// The handler receives the request method and path and returns status and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some((method, path)) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(method, path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read one HTTP/1.1 request and return its method and path.
async fn read_request(socket: &mut TcpStream) -> Option<(String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let mut request_line = head.lines().next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    Some((method, path))
}

/// Scripted upstream broadcaster that counts calls.
pub struct MockUpstream {
    pub addr: SocketAddr,
    pub broadcasts: Arc<AtomicU32>,
    pub checks: Arc<AtomicU32>,
    pub check_paths: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn broadcasts(&self) -> u32 {
        self.broadcasts.load(Ordering::SeqCst)
    }

    pub fn checks(&self) -> u32 {
        self.checks.load(Ordering::SeqCst)
    }
}

/// Start an upstream whose broadcast answers `broadcast` and whose status
/// checks walk through `statuses`, repeating the last one.
pub async fn start_mock_upstream(
    broadcast: (u16, &'static str),
    statuses: Vec<&'static str>,
) -> MockUpstream {
    let broadcasts = Arc::new(AtomicU32::new(0));
    let checks = Arc::new(AtomicU32::new(0));
    let check_paths = Arc::new(Mutex::new(Vec::new()));
    let statuses = Arc::new(statuses);

    let (b, c, p) = (broadcasts.clone(), checks.clone(), check_paths.clone());
    let addr = start_programmable_backend(move |method, path| {
        let (b, c, p, statuses) = (b.clone(), c.clone(), p.clone(), statuses.clone());
        async move {
            if method == "POST" && path == "/broadcast" {
                b.fetch_add(1, Ordering::SeqCst);
                return (broadcast.0, broadcast.1.to_string());
            }
            if method == "GET" && path.starts_with("/check/") {
                let i = c.fetch_add(1, Ordering::SeqCst) as usize;
                p.lock().unwrap().push(path);
                let status = statuses[i.min(statuses.len() - 1)];
                return (200, format!(r#"{{"tx_status":"{}"}}"#, status));
            }
            (404, r#"{"error":"not found"}"#.to_string())
        }
    })
    .await;

    MockUpstream {
        addr,
        broadcasts,
        checks,
        check_paths,
    }
}

/// Config pointing at `upstream` with a one second poll interval.
pub fn proxy_config(upstream: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.address = upstream.to_string();
    config.upstream.request_timeout_secs = 5;
    config.listener.host = "127.0.0.1".to_string();
    config.listener.graceful_stop_timeout_secs = 2;
    config.monitor.poll_interval_secs = 1;
    config
}

/// Start the proxy on an ephemeral port.
pub async fn start_proxy(
    config: ProxyConfig,
) -> (SocketAddr, Arc<Shutdown>, tokio::task::JoinHandle<std::io::Result<()>>) {
    let shutdown = Arc::new(Shutdown::new());
    let server = HttpServer::new(config, shutdown.clone()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(server.run(listener));
    (addr, shutdown, handle)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
