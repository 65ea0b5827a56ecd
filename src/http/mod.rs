//! REST surface for cash cards.
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/cashcards/{id}` | 200 + card |
//! | POST | `/cashcards` | 201 + `Location` |
//! | GET | `/cashcards?page=&size=&sort=` | 200 + cards |
//! | PUT | `/cashcards/{id}` | 204 |
//!
//! Every route requires HTTP Basic credentials of a user with the card owner role.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::{Next, from_fn},
    response::Response,
    routing::get,
};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::application::CashCardService;
use crate::auth::UserStore;

pub mod error;
pub mod extract;
pub mod handlers;
pub mod query;

pub use extract::CardOwner;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Shared state handed to every handler.
pub struct AppState {
    pub service: CashCardService,
    pub users: UserStore,
}

impl AppState {
    pub fn new(service: CashCardService, users: UserStore) -> Arc<Self> {
        Arc::new(Self { service, users })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/cashcards",
            get(handlers::find_all).post(handlers::create),
        )
        .route(
            "/cashcards/{id}",
            get(handlers::find_by_id).put(handlers::update),
        )
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Serve until Ctrl+C or SIGTERM.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    let address = listener
        .local_addr()
        .context("Failed to read listener address")?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Tag each request with an id, reusing the caller's `x-request-id` when sane.
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty() && value.len() <= 128)
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = info_span!(
        "http.request",
        request_id = %request_id,
        method = %request.method(),
        route = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                error!(error = %err, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!(error = %err, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
