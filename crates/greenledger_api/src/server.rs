//! HTTP server loop.

use crate::routes::router;
use crate::state::AppState;
use log::info;
use std::future::Future;
use tokio::net::TcpListener;

/// Serves the API on `listener` until `shutdown` resolves.
///
/// In-flight requests are drained before returning.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let local_addr = listener.local_addr()?;
    info!("event=server_start module=api status=ok addr={local_addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("event=server_stop module=api status=ok addr={local_addr}");
    Ok(())
}
