use crate::dashboard::{Dashboard, LoadOutcome};
use crate::errors::AppError;
use crate::models::{FilterState, Tab};
use crate::state::AppState;
use crate::ui::render_index;
use crate::view::ViewSnapshot;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};
use std::future::Future;
use tracing::error;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.dashboard.snapshot().await;
    Html(render_index(&snapshot))
}

pub async fn get_view(State(state): State<AppState>) -> Json<ViewSnapshot> {
    Json(state.dashboard.snapshot().await)
}

pub async fn switch_tab(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Redirect, AppError> {
    let tab = parse_tab(&name)?;
    run_detached(&state, move |dashboard| async move { dashboard.switch_tab(tab).await }).await;
    Ok(Redirect::to("/"))
}

pub async fn api_switch_tab(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ViewSnapshot>, AppError> {
    let tab = parse_tab(&name)?;
    run_detached(&state, move |dashboard| async move { dashboard.switch_tab(tab).await }).await;
    Ok(Json(state.dashboard.snapshot().await))
}

pub async fn apply_filters(
    State(state): State<AppState>,
    Form(filters): Form<FilterState>,
) -> Redirect {
    run_detached(&state, move |dashboard| async move {
        dashboard.apply_filters(filters).await
    })
    .await;
    Redirect::to("/")
}

pub async fn api_apply_filters(
    State(state): State<AppState>,
    Json(filters): Json<FilterState>,
) -> Json<ViewSnapshot> {
    run_detached(&state, move |dashboard| async move {
        dashboard.apply_filters(filters).await
    })
    .await;
    Json(state.dashboard.snapshot().await)
}

pub async fn refresh(State(state): State<AppState>) -> Redirect {
    run_detached(&state, |dashboard| async move { dashboard.load_active().await }).await;
    Redirect::to("/")
}

pub async fn api_refresh(State(state): State<AppState>) -> Json<ViewSnapshot> {
    run_detached(&state, |dashboard| async move { dashboard.load_active().await }).await;
    Json(state.dashboard.snapshot().await)
}

fn parse_tab(name: &str) -> Result<Tab, AppError> {
    name.parse().map_err(AppError::bad_request)
}

// Loads run on their own task so a client that disconnects mid-request
// cannot leave a tab switch half applied.
async fn run_detached<F, Fut>(state: &AppState, action: F) -> LoadOutcome
where
    F: FnOnce(Dashboard) -> Fut,
    Fut: Future<Output = LoadOutcome> + Send + 'static,
{
    match tokio::spawn(action(state.dashboard.clone())).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(error = %err, "dashboard load task failed");
            LoadOutcome::Failed
        }
    }
}
