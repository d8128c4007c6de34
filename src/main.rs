//! Main entry point for the hospadm application.
//!
//! Serves the admission-order REST API against the configured order/catalog
//! backend.
//!
//! # Environment Variables
//! - `HOSPADM_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
//! - `HOSPADM_BACKEND_URL`: order/catalog backend base URL
//! - `HOSPADM_BACKEND_TOKEN`: bearer token for the backend (optional)
//! - `HOSPADM_FUA_CODES`, `HOSPADM_SECURED_CODES`: insurance-code sets
//!   (comma-separated; documented defaults apply when unset)
//!
//! # Returns
//! * `Ok(())` - If the server starts and runs successfully
//! * `Err(anyhow::Error)` - If startup or runtime fails

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hospadm_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    api_rest::serve_from_env().await
}
