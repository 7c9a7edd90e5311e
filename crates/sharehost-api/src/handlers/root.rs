use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::state::AppState;

pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [(header::LOCATION, state.config.server().redirect_url.clone())],
    )
}
