//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the backend pool and fail fast on bad configuration
//! - Create the Axum router with the request router as catch-all fallback
//! - Wire up middleware (tracing, request ID)
//! - Spawn one health prober per backend
//! - Serve until shutdown, then drain and stop the probers

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{validate_config, ConfigError, LbConfig};
use crate::health::active::HealthMonitor;
use crate::http::forward::Forwarder;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::lifecycle::Shutdown;
use crate::load_balancer::{BackendPool, PoolError};
use crate::routing::{route_request, RequestRouter};

/// Error preventing the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    config: LbConfig,
    pool: Arc<BackendPool>,
}

impl HttpServer {
    /// Validate the configuration and build every subsystem.
    pub fn new(config: LbConfig) -> Result<Self, StartupError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let pool = Arc::new(BackendPool::from_config(&config.backends)?);
        let forwarder = Forwarder::new(
            config.forwarding.timeout_secs.map(Duration::from_secs),
            config.forwarding.rewrite_host,
        );
        let request_router = RequestRouter::new(pool.clone(), forwarder, config.routing.failover);

        tracing::info!(
            backends = pool.len(),
            failover = config.routing.failover,
            "Backend pool ready"
        );
        for backend in pool.backends() {
            tracing::debug!(backend = %backend.url(), "Registered backend");
        }

        let router = Self::build_router(request_router);
        Ok(Self {
            router,
            config,
            pool,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(request_router: RequestRouter) -> Router {
        Router::new()
            .fallback(route_request)
            .with_state(request_router)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// Run the server on `listener` until `shutdown` triggers.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Load balancer listening");

        let probers = if self.config.health_check.enabled {
            HealthMonitor::new(self.pool.clone(), &self.config.health_check).spawn(&shutdown)
        } else {
            tracing::info!("Active health checks disabled");
            Vec::new()
        };

        let mut server_shutdown = shutdown.subscribe();
        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.recv().await;
                tracing::info!("Stopping listener, draining in-flight requests");
            })
            .await;

        // Probers share the signal; make sure they stop even if serve failed.
        shutdown.trigger();
        for handle in probers {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Health prober task ended abnormally");
            }
        }

        tracing::info!("HTTP server stopped");
        result
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &LbConfig {
        &self.config
    }

    /// The backend pool served by this server.
    pub fn pool(&self) -> &Arc<BackendPool> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::config::ValidationError;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn empty_pool_prevents_startup() {
        let mut config = LbConfig::default();
        config.backends.clear();

        match HttpServer::new(config) {
            Err(StartupError::Config(ConfigError::Validation(errors))) => {
                assert_eq!(errors, vec![ValidationError::NoBackends]);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("server must not start without backends"),
        }
    }

    #[test]
    fn malformed_backend_prevents_startup() {
        let mut config = LbConfig::default();
        config.backends = vec![BackendConfig::new("ftp://127.0.0.1:21")];

        assert!(matches!(
            HttpServer::new(config),
            Err(StartupError::Config(_))
        ));
    }

    #[tokio::test]
    async fn every_method_and_path_reaches_the_router() {
        let mut config = LbConfig::default();
        config.backends = vec![BackendConfig::new("http://127.0.0.1:4001")];
        let server = HttpServer::new(config).unwrap();
        server.pool().backends()[0].set_alive(false);

        for (method, path) in [("GET", "/"), ("POST", "/bookings"), ("DELETE", "/users/9/x")] {
            let request = Request::builder()
                .method(method)
                .uri(path)
                .body(Body::empty())
                .unwrap();
            let response = server.router.clone().oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
            assert!(response.headers().contains_key(X_REQUEST_ID));
        }
    }

    #[tokio::test]
    async fn client_request_id_is_echoed() {
        let mut config = LbConfig::default();
        config.backends = vec![BackendConfig::new("http://127.0.0.1:4001")];
        let server = HttpServer::new(config).unwrap();
        server.pool().backends()[0].set_alive(false);

        let request = Request::builder()
            .uri("/")
            .header(X_REQUEST_ID, "req-42")
            .body(Body::empty())
            .unwrap();
        let response = server.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.headers()[X_REQUEST_ID], "req-42");
    }
}
