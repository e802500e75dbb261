use axum::{
    Router,
    routing::{get, post},
};

use crate::{AppState, auth, listings, upload};

/// All `/api` routes. Every route is public; mutation is guarded
/// per-request by the owner check, not by a route-level auth layer.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        // Authentication endpoints
        .route("/auth/register", post(auth::handlers::register))
        .route("/auth/login", post(auth::handlers::login))
        // File upload (phase one of listing creation)
        .route("/upload", post(upload::handlers::upload_photo))
        // Property endpoints
        .route(
            "/properties",
            post(listings::handlers::create_property).get(listings::handlers::list_properties),
        )
        .route(
            "/properties/my-properties/{user_id}",
            get(listings::handlers::list_my_properties),
        )
        .route(
            "/properties/{id}",
            get(listings::handlers::get_property)
                .put(listings::handlers::update_property)
                .delete(listings::handlers::delete_property),
        )
}
