use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    controller::{Draft, EditState, NoteView, NotesController, Outcome, RowMode, UiState},
    dto::{DraftRequest, EditFieldsRequest, MutationResponse, OutcomeResponse, UserResponse},
    error::{ApiError, ErrorBody},
    handlers::read_create_form,
    models::{FileSummary, Note},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        get_state,
        refresh,
        update_draft,
        create_note,
        start_edit,
        update_edit,
        save_edit,
        cancel_edit,
        delete_note,
        current_user,
        sign_out
    ),
    components(schemas(
        UiState,
        NoteView,
        Note,
        Draft,
        FileSummary,
        EditState,
        RowMode,
        DraftRequest,
        EditFieldsRequest,
        MutationResponse,
        OutcomeResponse,
        UserResponse,
        ErrorBody
    )),
    tags(
        (name = "notes", description = "Notes page actions"),
        (name = "session", description = "Signed-in user")
    )
)]
pub struct ApiDoc;

async fn mutation(controller: &NotesController, outcome: Outcome) -> Response {
    let body = MutationResponse {
        outcome: outcome.into(),
        state: controller.state().await,
    };
    (StatusCode::OK, Json(body)).into_response()
}

#[utoipa::path(
    get,
    path = "/api/state",
    responses(
        (status = 200, description = "Current page state", body = UiState)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_state(State(controller): State<Arc<NotesController>>) -> Response {
    (StatusCode::OK, Json(controller.state().await)).into_response()
}

#[utoipa::path(
    post,
    path = "/api/refresh",
    responses(
        (status = 200, description = "Note list re-read from the backend", body = UiState),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 502, description = "Backend error", body = ErrorBody)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn refresh(State(controller): State<Arc<NotesController>>) -> Response {
    match controller.refresh().await {
        Ok(()) => (StatusCode::OK, Json(controller.state().await)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/draft",
    request_body = DraftRequest,
    responses(
        (status = 200, description = "Draft fields updated", body = UiState)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_draft(
    State(controller): State<Arc<NotesController>>,
    Json(payload): Json<DraftRequest>,
) -> Response {
    controller.set_draft(payload.name, payload.description).await;
    (StatusCode::OK, Json(controller.state().await)).into_response()
}

#[utoipa::path(
    post,
    path = "/api/notes",
    request_body(
        content_type = "multipart/form-data",
        description = "Fields `name`, `description` and an optional image `file`"
    ),
    responses(
        (status = 200, description = "Note created, or skipped for a blank name", body = MutationResponse),
        (status = 400, description = "Malformed form", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 502, description = "Upload or create failed", body = ErrorBody)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(controller): State<Arc<NotesController>>,
    multipart: Multipart,
) -> Response {
    let form = match read_create_form(multipart).await {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };

    match controller.create_from(form).await {
        Ok(outcome) => mutation(&controller, outcome).await,
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/notes/{id}/edit",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Edit form opened", body = UiState),
        (status = 404, description = "Note not in the list", body = ErrorBody)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn start_edit(
    State(controller): State<Arc<NotesController>>,
    Path(id): Path<String>,
) -> Response {
    match controller.start_edit(&id).await {
        Ok(()) => (StatusCode::OK, Json(controller.state().await)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/edit",
    request_body = EditFieldsRequest,
    responses(
        (status = 200, description = "Edit fields updated", body = UiState),
        (status = 409, description = "No note is being edited", body = ErrorBody)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_edit(
    State(controller): State<Arc<NotesController>>,
    Json(payload): Json<EditFieldsRequest>,
) -> Response {
    match controller
        .set_edit_fields(payload.name, payload.description)
        .await
    {
        Ok(()) => (StatusCode::OK, Json(controller.state().await)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/edit/save",
    responses(
        (status = 200, description = "Note updated, or skipped when nothing is being edited", body = MutationResponse),
        (status = 404, description = "Note no longer exists", body = ErrorBody),
        (status = 502, description = "Update failed", body = ErrorBody)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn save_edit(State(controller): State<Arc<NotesController>>) -> Response {
    match controller.save_edit().await {
        Ok(outcome) => mutation(&controller, outcome).await,
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/edit/cancel",
    responses(
        (status = 200, description = "Edit form closed", body = UiState)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn cancel_edit(State(controller): State<Arc<NotesController>>) -> Response {
    controller.cancel_edit().await;
    (StatusCode::OK, Json(controller.state().await)).into_response()
}

#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note deleted", body = UiState),
        (status = 404, description = "Note not found", body = ErrorBody),
        (status = 502, description = "Delete failed", body = ErrorBody)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(
    State(controller): State<Arc<NotesController>>,
    Path(id): Path<String>,
) -> Response {
    match controller.delete(&id).await {
        Ok(()) => (StatusCode::OK, Json(controller.state().await)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Signed-in user", body = UserResponse),
        (status = 401, description = "Not signed in", body = ErrorBody)
    ),
    tag = "session"
)]
#[debug_handler]
pub async fn current_user(State(controller): State<Arc<NotesController>>) -> Response {
    match controller.current_user().await {
        Ok(user) => (StatusCode::OK, Json(UserResponse::from(user))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/sign-out",
    responses(
        (status = 204, description = "Signed out"),
        (status = 502, description = "Identity provider error; the local session is still ended", body = ErrorBody)
    ),
    tag = "session"
)]
#[debug_handler]
pub async fn sign_out(State(controller): State<Arc<NotesController>>) -> Response {
    match controller.sign_out().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
