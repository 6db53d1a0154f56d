use axum::routing::get;
use axum::Router;

pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

// Liveness only, no database round trip.
async fn health() -> &'static str {
    "App is running"
}
