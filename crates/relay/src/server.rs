//! Inbound HTTP server

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{cors_layer, RelayConfig, RelayHandler, Result, UpstreamResponse};

/// The single relayed route
pub const DATA_ROUTE: &str = "/data";

/// Router serving `GET /data`, wrapped in tracing and the CORS policy.
///
/// CORS is the outermost layer so error responses carry the headers too.
pub fn router(handler: Arc<RelayHandler>) -> Result<Router> {
    let cors = cors_layer(&handler.config().allowed_origins)?;

    Ok(Router::new()
        .route(DATA_ROUTE, get(get_data))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(handler))
}

async fn get_data(
    State(handler): State<Arc<RelayHandler>>,
) -> Result<UpstreamResponse> {
    handler.fetch().await
}

/// Handle to a running relay.
pub struct RelayHandle {
    pub url: String,
    pub local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RelayHandle {
    /// Stop accepting connections and wait for in-flight requests
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            warn!("Relay server task failed: {}", e);
        }
        info!("Relay stopped");
    }
}

/// Bind the listen address and serve in the background.
pub async fn start(config: RelayConfig) -> Result<RelayHandle> {
    let listen_addr = config.listen_addr;
    let upstream = config.upstream_url.to_string();
    let timeout = config.timeout;

    let handler = Arc::new(RelayHandler::new(config)?);
    let app = router(handler)?;

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    let local_addr = listener.local_addr()?;
    let url = format!("http://{}", local_addr);
    info!(%url, %upstream, timeout_secs = timeout.as_secs_f64(), "Relay listening");

    let (tx, rx) = oneshot::channel();
    let task = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = rx.await;
            })
            .await;
        if let Err(e) = result {
            warn!("Relay server error: {}", e);
        }
    });

    Ok(RelayHandle {
        url,
        local_addr,
        shutdown: tx,
        task,
    })
}
