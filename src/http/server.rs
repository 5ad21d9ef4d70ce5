//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding handler
//! - Wire up middleware (header rewrite, request ID, timeout, tracing)
//! - Bind server to listener
//! - Forward requests to the upstream and relay its response

use axum::{
    body::Body,
    extract::State,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::request::{self, X_REQUEST_ID};
use crate::observability::metrics;
use crate::rewrite::{HeaderRewriteLayer, RewriteError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Authority,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the rewriting proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if the rewrite rules do not compile or the upstream address is
    /// not a valid authority.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let rewrite = HeaderRewriteLayer::new(&config.rewrite.name, &config.rewrite.config)?;

        let upstream = Authority::from_str(&config.upstream.address)
            .map_err(|_| ServerError::Upstream(config.upstream.address.clone()))?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState { upstream, client };
        let router = Self::build_router(&config, state, rewrite);

        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The rewrite layer wraps the timeout, so it also sees the 408 produced
    /// when the upstream is too slow. Request-id and trace layers sit outside
    /// it and observe the rewritten response.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState, rewrite: HeaderRewriteLayer) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(rewrite)
            .layer(request::propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(request::set_request_id_layer())
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            rewrite_rules = self.config.rewrite.config.rewrites.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The fully layered router, for serving or driving directly in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Errors raised while building the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error("invalid upstream address {0:?}")]
    Upstream(String),
}

/// Forwards the request to the upstream and returns its response unchanged.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let method = request.method().to_string();
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %request.uri().path(),
        "Proxying request"
    );

    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Invalid upstream URI");
            metrics::record_request(&method, 400, start_time);
            return (StatusCode::BAD_REQUEST, "Invalid request URI").into_response();
        }
    };
    parts.headers.remove(header::HOST);
    parts.version = Version::HTTP_11;

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), start_time);
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_request(&method, 502, start_time);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
