//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, for development and debugging. The
//! workspace's main `hospadm-run` binary is the deployment entry point.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    api_rest::serve_from_env().await
}
