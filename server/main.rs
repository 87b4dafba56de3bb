//! mushroom-classifier server
//!
//! Accepts an uploaded image on `POST /predict` and answers with the top
//! candidate species as JSON. Served by a synchronous tiny_http server, one
//! thread per request.
//!
//! Run with:
//!   cargo run --release
//! Configuration comes from `MUSHROOM_*` environment variables; log verbosity
//! from `RUST_LOG` (default `info`).
//!
//! Routes:
//!   POST    /predict  : multipart upload, field `file`
//!   OPTIONS /predict  : CORS preflight
//!   GET     /health   : readiness probe

mod state;
mod routes;
mod handlers;
mod util;

use std::sync::Arc;

use tiny_http::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mushroom_classifier::{Service, ServiceConfig};
use state::AppState;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting mushroom classifier API");

    let config = ServiceConfig::from_env()?;
    tracing::info!(
        top_k = config.top_k,
        threshold = config.confidence_threshold,
        origins = config.allowed_origins.len(),
        "Loaded configuration"
    );

    // Loading happens before the first request is accepted; a failure leaves
    // the service answering "unavailable" rather than exiting.
    let service = Service::initialize(&config);
    let shared_state = Arc::new(AppState::new(service, &config));

    let server = Server::http(&config.bind)?;
    tracing::info!("Listening on {}", config.bind);

    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }

    Ok(())
}
