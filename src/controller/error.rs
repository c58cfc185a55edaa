use crate::backend::BackendError;

/// Failure of a controller operation, naming the step that failed.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("Failed to list notes: {0}")]
    Refresh(#[source] BackendError),

    #[error("Failed to resolve image link for {key}: {source}")]
    ImageUrl { key: String, source: BackendError },

    #[error("Failed to upload {key}: {source}")]
    Upload { key: String, source: BackendError },

    #[error("Failed to create note: {0}")]
    Create(#[source] BackendError),

    #[error("Failed to update note {id}: {source}")]
    Update { id: String, source: BackendError },

    #[error("Failed to delete note {id}: {source}")]
    Delete { id: String, source: BackendError },

    #[error("Failed to remove image {key}: {source}")]
    BlobCleanup { key: String, source: BackendError },

    #[error("Note {0} is not in the current list")]
    UnknownNote(String),

    #[error("No note is being edited")]
    NotEditing,

    #[error("Session error: {0}")]
    Session(#[source] BackendError),
}

impl ControllerError {
    /// The backend error underneath, if any.
    pub const fn backend(&self) -> Option<&BackendError> {
        match self {
            Self::Refresh(source)
            | Self::Create(source)
            | Self::Session(source)
            | Self::ImageUrl { source, .. }
            | Self::Upload { source, .. }
            | Self::Update { source, .. }
            | Self::Delete { source, .. }
            | Self::BlobCleanup { source, .. } => Some(source),
            Self::UnknownNote(_) | Self::NotEditing => None,
        }
    }
}
