//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::middleware::{auth_middleware, AuthState};
use crate::handlers;
use crate::state::AppState;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn setup_routes(state: Arc<AppState>) -> Router {
    let server = state.config.server();
    let body_limit = server.max_file_size_bytes + MULTIPART_OVERHEAD;

    let auth_state = Arc::new(AuthState {
        jwt_secret: state.config.jwt_secret().to_string(),
        users: state.users.clone(),
    });

    let public_routes = Router::new()
        .route("/", get(handlers::root::index))
        .route("/login", post(handlers::login::login))
        .route("/view/{filename}", get(handlers::view::view_file))
        .route("/oembed/{filename}", get(handlers::view::oembed))
        .route("/download/{filename}", get(handlers::view::download_file));

    let protected_routes = Router::new()
        .route("/upload", post(handlers::upload::upload_file))
        .route("/files", get(handlers::files::list_own_files))
        .route("/files/{username}", get(handlers::files::list_user_files))
        .route("/delete/{filename}", delete(handlers::files::delete_own_file))
        .route(
            "/delete-file/{filename}",
            delete(handlers::files::delete_own_file),
        )
        .route(
            "/delete-file/{username}/{filename}",
            delete(handlers::files::delete_user_file),
        )
        .route("/delete-user", delete(handlers::users::delete_own_account))
        .route(
            "/delete-user/{username}",
            delete(handlers::users::delete_account),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    public_routes
        .merge(protected_routes)
        .with_state(state.clone())
        .nest_service("/uploads", ServeDir::new(&server.upload_dir))
        .fallback_service(ServeDir::new(&server.public_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
