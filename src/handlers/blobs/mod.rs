//! Serves images stored by the in-memory backend through the links it issues.

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use serde::Deserialize;

use std::sync::Arc;

use crate::{backend::BackendError, controller::NotesController};

#[derive(Debug, Deserialize)]
pub struct LinkQuery {
    /// Unix timestamp the link stops working at
    pub expires: i64,
}

#[debug_handler]
pub async fn serve_blob(
    State(controller): State<Arc<NotesController>>,
    Path(key): Path<String>,
    Query(link): Query<LinkQuery>,
) -> Response {
    let Some(host) = controller.blob_host() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match host.signed_blob(&key, link.expires) {
        Ok((content_type, bytes)) => {
            ([(header::CONTENT_TYPE, content_type)], bytes).into_response()
        }
        Err(BackendError::Forbidden(_)) => {
            tracing::debug!("Refused expired or altered link to {}", key);
            StatusCode::FORBIDDEN.into_response()
        }
        Err(e) => {
            tracing::debug!("Blob link failed: {}", e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
