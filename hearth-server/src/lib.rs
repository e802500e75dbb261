//! # Hearth Server
//!
//! REST/JSON API for a property-rental listing service.
//!
//! ## Overview
//!
//! - **Accounts**: username/password registration and login with salted
//!   password hashing; login mints a signed identity claim.
//! - **Listings**: create/read/update/delete of property records with
//!   owner-scoped authorization and a case-insensitive location search.
//! - **Uploads**: listing photos go through an external file-storage
//!   collaborator that answers with a durable URL.
//!
//! ## Architecture
//!
//! The server is built on Axum and uses PostgreSQL for persistent
//! storage; all decision logic lives in `hearth-core` services, the
//! handlers here only translate between HTTP and those services.

pub mod auth;
pub mod infra;
pub mod listings;
pub mod routes;
pub mod upload;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use infra::app_state::AppState;

/// Assemble the full application router: the `/api` surface, statically
/// served uploads, permissive CORS and request tracing.
pub fn create_app(state: AppState) -> Router {
    let uploads_dir = state.config.upload_dir.clone();

    Router::new()
        .route("/", get(welcome))
        .nest("/api", routes::create_api_router())
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn welcome() -> &'static str {
    "Welcome to the Hearth API! Server is running."
}
