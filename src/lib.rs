pub mod backend;
pub mod config;
pub mod controller;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod view;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

use backend::memory::BLOB_ROUTE;
use controller::NotesController;
use handlers::{blobs, rest, ui, upload_body_limit};

/// Build the application router: the HTML page, its form routes and the JSON API.
pub fn build_router(controller: Arc<NotesController>) -> Router {
    let api_router = Router::new()
        .route("/state", get(rest::get_state))
        .route("/refresh", post(rest::refresh))
        .route("/draft", put(rest::update_draft))
        .route("/notes", post(rest::create_note).layer(upload_body_limit()))
        .route("/notes/{id}", axum::routing::delete(rest::delete_note))
        .route("/notes/{id}/edit", post(rest::start_edit))
        .route("/edit", put(rest::update_edit))
        .route("/edit/save", post(rest::save_edit))
        .route("/edit/cancel", post(rest::cancel_edit))
        .route("/me", get(rest::current_user))
        .route("/sign-out", post(rest::sign_out));

    let ui_router = Router::new()
        .route("/create", post(ui::create).layer(upload_body_limit()))
        .route("/notes/{id}/edit", post(ui::start_edit))
        .route("/notes/{id}/delete", post(ui::delete))
        .route("/edit/save", post(ui::save_edit))
        .route("/edit/cancel", post(ui::cancel_edit))
        .route("/sign-out", post(ui::sign_out));

    Router::new()
        .route("/", get(ui::index))
        .route(&format!("{BLOB_ROUTE}/{{*key}}"), get(blobs::serve_blob))
        .nest("/api", api_router)
        .nest("/ui", ui_router)
        .with_state(controller)
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", rest::ApiDoc::openapi()),
        )
        .layer(TraceLayer::new_for_http())
}
