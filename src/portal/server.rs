//! Usage: Portal HTTP server lifecycle (bind, serve with graceful shutdown, stop).

use crate::app::app_state::PortalState;
use crate::infra::settings::PortalSettings;
use crate::shared::error::{AppError, AppResult};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::listen::parse_listen_address;
use super::routes::build_router;

pub struct RunningPortal {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RunningPortal {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(err) = self.task.await {
            tracing::error!("portal server task failed: {err}");
        }
        tracing::info!(addr = %self.local_addr, "portal stopped");
    }
}

pub async fn start(settings: PortalSettings) -> AppResult<RunningPortal> {
    let parsed = parse_listen_address(&settings.listen_address)
        .map_err(|e| format!("CONFIG_INVALID: {e}"))?;
    let bind_target = parsed.bind_target();

    let listener = TcpListener::bind(bind_target.as_str())
        .await
        .map_err(|e| {
            AppError::with_source(
                "SYSTEM_ERROR",
                format!("portal bind failed on {bind_target}: {e}"),
                e,
            )
        })?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| format!("SYSTEM_ERROR: portal local_addr failed: {e}"))?;

    let public_base_url = settings.public_base_url.clone();
    let router = build_router(PortalState::new(settings)?);
    let (shutdown, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
        if let Err(err) = result {
            tracing::error!("portal server stopped with error: {err}");
        }
    });

    tracing::info!(
        addr = %local_addr,
        public_base_url = %public_base_url,
        "portal listening"
    );

    Ok(RunningPortal {
        local_addr,
        shutdown,
        task,
    })
}
