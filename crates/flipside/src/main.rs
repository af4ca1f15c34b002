//! Flipside server binary.
//!
//! Bind address comes from `FLIPSIDE_ADDR` (default `127.0.0.1:8080`),
//! log filtering from `RUST_LOG`.

use flipside::{FlipsideError, ServerBuilder};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), FlipsideError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("FLIPSIDE_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    let server = ServerBuilder::new().bind(&addr).build().await?;
    tracing::info!(%addr, "flipside listening");
    server.run().await
}
