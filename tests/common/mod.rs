//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;

use balancer_proxy::config::BackendsConfig;
use balancer_proxy::{BackendRegistry, Dispatcher, HttpServer, ProxyConfig, Shutdown};

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a backend that echoes the request it received.
///
/// The body has the form:
/// ```text
/// <METHOD> <path?query>
/// host=<host>
/// xff=<x-forwarded-for>
/// x-custom=<x-custom>
/// x-request-id=<x-request-id>
///
/// <request body>
/// ```
/// and the response carries `x-backend: <name>`.
#[allow(dead_code)]
pub async fn start_echo_backend(name: &'static str) -> SocketAddr {
    let app = Router::new().fallback(
        move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| async move {
            let header = |key: &str| {
                headers
                    .get(key)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-")
                    .to_string()
            };
            let echoed = format!(
                "{} {}\nhost={}\nxff={}\nx-custom={}\nx-request-id={}\n\n{}",
                method,
                uri,
                header("host"),
                header("x-forwarded-for"),
                header("x-custom"),
                header("x-request-id"),
                String::from_utf8_lossy(&body),
            );
            ([("x-backend", name)], echoed)
        },
    );
    serve(app).await
}

/// Start a backend that counts hits and answers with a fixed status.
#[allow(dead_code)]
pub async fn start_counting_backend(status: StatusCode) -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().fallback(move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            (status, [("x-upstream", "counting")], "counted")
        }
    });
    (serve(app).await, hits)
}

/// Start a backend that waits `delay` before answering.
#[allow(dead_code)]
pub async fn start_slow_backend(delay: Duration) -> SocketAddr {
    let app = Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        "slow"
    });
    serve(app).await
}

/// A running load balancer bound to an ephemeral port.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub dispatcher: Arc<Dispatcher>,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_proxy(backends: &[SocketAddr]) -> TestProxy {
    start_proxy_with_config(backends, ProxyConfig::default()).await
}

/// Start a proxy in front of `backends`, replacing the backend list of `config`.
pub async fn start_proxy_with_config(backends: &[SocketAddr], mut config: ProxyConfig) -> TestProxy {
    config.backends = BackendsConfig(backends.iter().map(|a| format!("http://{}", a)).collect());

    let registry = Arc::new(BackendRegistry::new(config.backends.addresses()).unwrap());
    let dispatcher = Arc::new(Dispatcher::new(registry));
    let server = HttpServer::new(dispatcher.clone(), &config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy {
        addr,
        dispatcher,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
