//! HTTP host for the Turnstile modules.
//!
//! Modules contribute a router and an OpenAPI document; the ingress adds the
//! shared middleware stack, `/health`, `/openapi.json` and the serve loop.

use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{middleware::from_fn, response::Json, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use utoipa::openapi::OpenApi;

pub mod config;
pub mod openapi;
pub mod request_id;
pub mod web;

pub use config::ApiIngressConfig;

pub struct ApiIngress {
    config: ApiIngressConfig,
    routes: Router,
    doc: OpenApi,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config,
            routes: Router::new(),
            doc: openapi::base_document(),
        }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Mount a module: `register` adds its routes, `doc` is merged into `/openapi.json`.
    pub fn register(mut self, register: impl FnOnce(Router) -> Router, doc: OpenApi) -> Self {
        self.routes = register(self.routes);
        self.doc.merge(doc);
        self
    }

    pub fn openapi(&self) -> &OpenApi {
        &self.doc
    }

    /// Final router with the middleware stack, innermost layer first.
    pub fn build_router(&self) -> Result<Router> {
        let doc = serde_json::to_value(&self.doc).context("Failed to render OpenAPI document")?;
        let x_request_id = request_id::header();

        let mut router = self
            .routes
            .clone()
            .route("/health", get(web::health_check))
            .route(
                "/openapi.json",
                get(move || {
                    let doc = doc.clone();
                    async move { Json(doc) }
                }),
            )
            .fallback(web::not_found);

        router = router.layer(TimeoutLayer::new(self.config.timeout));
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = router.layer(request_id::create_trace_layer());
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));
        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        Ok(router)
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = self
            .config
            .bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.config.bind_addr))?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        self.serve_on(listener, shutdown).await
    }

    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router()?;
        tracing::info!(addr = %listener.local_addr()?, "HTTP server bound");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}
