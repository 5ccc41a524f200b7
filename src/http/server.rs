//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Select a backend per request and forward to it
//! - Serve until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::time;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::request::{self, request_id};
use crate::http::response::{self, ForwardError};
use crate::load_balancer::{Backend, Dispatcher};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub client: Client<HttpConnector, Body>,
    pub upstream_timeout: Option<Duration>,
}

/// HTTP front end of the load balancer.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server dispatching through `dispatcher`.
    pub fn new(dispatcher: Arc<Dispatcher>, config: &ProxyConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            dispatcher,
            client,
            upstream_timeout: config.timeouts.upstream_secs.map(Duration::from_secs),
        };

        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The configured router, without connect info.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve connections from `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Select a backend and forward the request to it.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(&request).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let Some(backend) = state.dispatcher.select_backend() else {
        tracing::warn!(request_id = %request_id, method = %method, path = %path, "No healthy backends");
        return response::service_unavailable();
    };

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        backend = %backend,
        "Routing to {}",
        backend
    );

    match forward(&state, &backend, request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, backend = %backend, error = %e, "Upstream error");
            e.into_response()
        }
    }
}

async fn forward(state: &AppState, backend: &Backend, request: Request<Body>) -> Result<Response, ForwardError> {
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let upstream = request::prepare(backend, client_ip, request)?;
    let pending = state.client.request(upstream);

    let response = match state.upstream_timeout {
        Some(limit) => time::timeout(limit, pending)
            .await
            .map_err(|_| ForwardError::Timeout(limit))??,
        None => pending.await?,
    };

    Ok(response::relay(response))
}
