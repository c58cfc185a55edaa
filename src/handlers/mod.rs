pub mod blobs;
pub mod rest;
pub mod ui;

use axum::extract::{DefaultBodyLimit, Multipart};

use crate::{controller::Draft, error::ApiError, models::Upload};

pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(16 * 1024 * 1024) // 16 MB
}

/// Read `name`, `description` and the optional `file` part of a create form.
///
/// A file part without a file name is how browsers submit an empty file
/// input, and counts as no file. An empty file that was picked is kept.
pub async fn read_create_form(mut multipart: Multipart) -> Result<Draft, ApiError> {
    let mut form = Draft::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("name") => {
                form.name = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Failed to read name: {e}")))?;
            }
            Some("description") => {
                form.description = field.text().await.map_err(|e| {
                    ApiError::Validation(format!("Failed to read description: {e}"))
                })?;
            }
            Some("file") => {
                let file_name = field.file_name().map(ToString::to_string);
                let content_type = field.content_type().map(ToString::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Failed to read file: {e}")))?;

                form.file = match file_name {
                    Some(file_name) if !file_name.is_empty() => {
                        Some(Upload::new(file_name, content_type, bytes.to_vec()))
                    }
                    _ => None,
                };
            }
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(form)
}
