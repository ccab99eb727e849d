use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/tab/:name", post(handlers::switch_tab))
        .route("/filters", post(handlers::apply_filters))
        .route("/refresh", post(handlers::refresh))
        .route("/api/view", get(handlers::get_view))
        .route("/api/tab/:name", post(handlers::api_switch_tab))
        .route("/api/filters", post(handlers::api_apply_filters))
        .route("/api/refresh", post(handlers::api_refresh))
        .with_state(state)
}
