//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use page_bootstrap::assets::BundleManifestStore;
use page_bootstrap::http::{HttpServer, Services};
use page_bootstrap::identity::{IdentityError, IdentityService, User};
use page_bootstrap::render::ShellRenderer;
use page_bootstrap::{ServerConfig, Shutdown};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a programmable identity backend on an ephemeral port.
///
/// The closure receives the raw request head and returns `(status, body)`.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let head = read_head(&mut socket).await;
                let (status, body) = f(head).await;
                let status_text = match status {
                    200 => "200 OK",
                    403 => "403 Forbidden",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    502 => "502 Bad Gateway",
                    _ => "200 OK",
                };

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
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

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Identity stub returning a canned result and counting calls.
#[allow(dead_code)]
pub struct StubIdentity {
    pub calls: AtomicUsize,
    pub cookies: Mutex<Vec<String>>,
    result: fn() -> Result<User, IdentityError>,
}

#[allow(dead_code)]
impl StubIdentity {
    pub fn new(result: fn() -> Result<User, IdentityError>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            cookies: Mutex::new(Vec::new()),
            result,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IdentityService for StubIdentity {
    fn fetch_user<'a>(&'a self, cookie_header: &'a str) -> BoxFuture<'a, Result<User, IdentityError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cookies.lock().unwrap().push(cookie_header.to_string());
        let result = (self.result)();
        Box::pin(async move { result })
    }
}

/// A running page server.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a page server on an ephemeral port with the given identity service.
#[allow(dead_code)]
pub async fn start_server(config: ServerConfig, identity: Arc<dyn IdentityService>) -> TestServer {
    let services = Services {
        identity,
        renderer: Arc::new(ShellRenderer::default()),
        bundles: Arc::new(BundleManifestStore::from_assets(Vec::new())),
    };
    let server = HttpServer::with_services(config, services).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer { addr, shutdown }
}

/// HTTP client that reports redirects instead of following them.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
