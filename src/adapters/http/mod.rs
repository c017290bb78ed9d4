pub mod error;
pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use crate::adapters::http::state::HttpState;

pub fn router(state: HttpState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/api/analyze-image", post(routes::analyze_image))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
