//! Shared test harness: a fake ebusd upstream and relay startup helpers

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::sync::oneshot;

use busrelay_relay::{AllowedOrigins, RelayConfig, RelayHandle};

pub const EBUSD_JSON: &str = r#"{"status":"ok","value":42}"#;

/// Fake ebusd with one route per upstream behaviour
pub struct TestUpstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    shutdown: oneshot::Sender<()>,
}

impl TestUpstream {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Requests received so far, across all routes
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn stop(self) {
        let _ = self.shutdown.send(());
    }
}

async fn count(State(hits): State<Arc<AtomicUsize>>) {
    hits.fetch_add(1, Ordering::SeqCst);
}

pub async fn start_test_upstream() -> TestUpstream {
    let hits = Arc::new(AtomicUsize::new(0));
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new()
        .route(
            "/data",
            get(|state: State<Arc<AtomicUsize>>| async move {
                count(state).await;
                ([(header::CONTENT_TYPE, "application/json")], EBUSD_JSON)
            }),
        )
        .route(
            "/text",
            get(|state: State<Arc<AtomicUsize>>| async move {
                count(state).await;
                ([(header::CONTENT_TYPE, "text/plain")], "outsidetemp=7.5")
            }),
        )
        .route(
            "/missing",
            get(|state: State<Arc<AtomicUsize>>| async move {
                count(state).await;
                StatusCode::NOT_FOUND
            }),
        )
        .route(
            "/broken",
            get(|state: State<Arc<AtomicUsize>>| async move {
                count(state).await;
                (StatusCode::INTERNAL_SERVER_ERROR, "ebusd failure").into_response()
            }),
        )
        .route(
            "/slow",
            get(|state: State<Arc<AtomicUsize>>| async move {
                count(state).await;
                tokio::time::sleep(Duration::from_millis(500)).await;
                ([(header::CONTENT_TYPE, "application/json")], EBUSD_JSON)
            }),
        )
        .route(
            "/hang",
            get(|state: State<Arc<AtomicUsize>>| async move {
                count(state).await;
                tokio::time::sleep(Duration::from_secs(30)).await;
                EBUSD_JSON
            }),
        )
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async { let _ = shutdown_rx.await; })
            .await
            .unwrap();
    });

    TestUpstream { addr, hits, shutdown: shutdown_tx }
}

/// Relay config on an ephemeral local port
pub fn relay_config(upstream_url: &str) -> RelayConfig {
    RelayConfig::new(upstream_url)
        .unwrap()
        .with_listen_addr("127.0.0.1:0".parse().unwrap())
}

pub async fn start_relay(upstream_url: &str, origins: AllowedOrigins) -> RelayHandle {
    busrelay_relay::start(relay_config(upstream_url).with_allowed_origins(origins))
        .await
        .unwrap()
}

pub fn data_url(relay: &RelayHandle) -> String {
    format!("{}{}", relay.url, busrelay_relay::DATA_ROUTE)
}

/// An address nothing listens on
pub fn dead_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
