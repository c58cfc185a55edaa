//! Browser routes: the rendered page and the form posts that drive it.

use axum::{
    Form,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_macros::debug_handler;
use serde::Deserialize;

use std::sync::Arc;

use crate::{
    controller::NotesController, error::ApiError, handlers::read_create_form, view::NotesPage,
};

#[derive(Debug, Deserialize)]
pub struct EditForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

async fn render(controller: &NotesController, status: StatusCode, error: Option<&str>) -> Response {
    let user = controller.current_user().await.ok();
    let state = controller.state().await;

    let page = NotesPage {
        signed_in_as: user.as_ref().map(|user| user.display_name()),
        error,
    };
    (status, Html(page.render(&state))).into_response()
}

/// Back to the page after a form post, or the page with the failure shown.
async fn finish(controller: &NotesController, result: Result<(), ApiError>) -> Response {
    match result {
        Ok(()) => Redirect::to("/").into_response(),
        Err(e) => {
            let (status, _) = e.status_and_code();
            tracing::warn!("Form action failed: {}", e);
            render(controller, status, Some(&e.to_string())).await
        }
    }
}

#[debug_handler]
pub async fn index(State(controller): State<Arc<NotesController>>) -> Response {
    render(&controller, StatusCode::OK, None).await
}

#[debug_handler]
pub async fn create(
    State(controller): State<Arc<NotesController>>,
    multipart: Multipart,
) -> Response {
    let result = match read_create_form(multipart).await {
        Ok(form) => controller
            .create_from(form)
            .await
            .map(|_| ())
            .map_err(ApiError::from),
        Err(e) => Err(e),
    };
    finish(&controller, result).await
}

#[debug_handler]
pub async fn start_edit(
    State(controller): State<Arc<NotesController>>,
    Path(id): Path<String>,
) -> Response {
    let result = controller.start_edit(&id).await.map_err(ApiError::from);
    finish(&controller, result).await
}

#[debug_handler]
pub async fn save_edit(
    State(controller): State<Arc<NotesController>>,
    Form(form): Form<EditForm>,
) -> Response {
    let result = match controller.set_edit_fields(form.name, form.description).await {
        Ok(()) => controller.save_edit().await.map(|_| ()),
        Err(e) => Err(e),
    };
    finish(&controller, result.map_err(ApiError::from)).await
}

#[debug_handler]
pub async fn cancel_edit(State(controller): State<Arc<NotesController>>) -> Response {
    controller.cancel_edit().await;
    Redirect::to("/").into_response()
}

#[debug_handler]
pub async fn delete(
    State(controller): State<Arc<NotesController>>,
    Path(id): Path<String>,
) -> Response {
    let result = controller.delete(&id).await.map_err(ApiError::from);
    finish(&controller, result).await
}

#[debug_handler]
pub async fn sign_out(State(controller): State<Arc<NotesController>>) -> Response {
    let result = controller.sign_out().await.map_err(ApiError::from);
    finish(&controller, result).await
}
