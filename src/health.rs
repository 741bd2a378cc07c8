use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Answer hosting-platform probes on `0.0.0.0:port`. Never takes the bot down.
pub fn spawn(port: u16) -> JoinHandle<()> {
    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                tracing::info!("Liveness endpoint listening on {}", addr);
                serve(listener).await;
            }
            Err(e) => tracing::error!("Liveness endpoint could not bind {}: {}", addr, e),
        }
    })
}

pub async fn serve(listener: TcpListener) {
    if let Err(e) = axum::serve(listener, router()).await {
        tracing::error!("Liveness endpoint stopped: {}", e);
    }
}

fn router() -> Router {
    Router::new().route("/", get(alive))
}

async fn alive() -> &'static str {
    "Bot is Alive"
}
