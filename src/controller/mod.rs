//! Notes page controller: holds the UI state and turns user actions into
//! backend calls, re-reading the list after every mutation.

mod error;
mod key;
mod policy;
mod state;

pub use error::ControllerError;
pub use key::storage_key;
pub use policy::{CleanupPolicy, DraftPolicy, OrphanPolicy, Policy};
pub use state::{Draft, EditState, NoteView, RowMode, UiState};

use futures::future::join_all;
use tokio::sync::Mutex;

use std::time::Duration;

use crate::{
    backend::{Backend, memory::MemoryPlatform},
    models::{NewNote, Note, NoteUpdate, Upload, User},
};

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Prepended to every generated storage key
    pub key_prefix: String,
    /// Lifetime of the image links resolved on refresh
    pub url_expiry: Duration,
    pub policy: Policy,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            key_prefix: "public/".to_string(),
            url_expiry: Duration::from_secs(60),
            policy: Policy::default(),
        }
    }
}

/// Whether an operation did anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Nothing to do: blank name on create, or no open edit form on save.
    Skipped,
}

pub struct NotesController {
    backend: Backend,
    settings: ControllerSettings,
    // Never held across a backend call.
    state: Mutex<UiState>,
}

impl NotesController {
    pub fn new(backend: Backend, settings: ControllerSettings) -> Self {
        Self {
            backend,
            settings,
            state: Mutex::new(UiState::default()),
        }
    }

    /// The in-process blob store behind memory links, if there is one.
    pub const fn blob_host(&self) -> Option<&MemoryPlatform> {
        self.backend.blob_host.as_ref()
    }

    pub async fn state(&self) -> UiState {
        self.state.lock().await.clone()
    }

    pub async fn current_user(&self) -> Result<User, ControllerError> {
        self.backend
            .session
            .current_user()
            .await
            .map_err(ControllerError::Session)
    }

    /// Replace the note list with the backend's current records.
    pub async fn refresh(&self) -> Result<(), ControllerError> {
        let notes = self
            .backend
            .notes
            .list()
            .await
            .map_err(ControllerError::Refresh)?;

        let views = join_all(notes.into_iter().map(|note| self.resolve_image_url(note)))
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Refreshed note list: {} notes", views.len());
        self.state.lock().await.notes = views;
        Ok(())
    }

    /// Attach a display link for the note's image.
    ///
    /// Notes without an image never reach storage. A failed lookup follows the
    /// cleanup policy: the note is shown without its image, or the error is returned.
    pub async fn resolve_image_url(&self, note: Note) -> Result<NoteView, ControllerError> {
        let Some(key) = note.image.clone() else {
            return Ok(NoteView::without_image(note));
        };

        match self
            .backend
            .storage
            .get_url(&key, self.settings.url_expiry)
            .await
        {
            Ok(signed) => Ok(NoteView {
                note,
                image_url: Some(signed.url),
            }),
            Err(source) => match self.settings.policy.cleanup {
                CleanupPolicy::LogAndContinue => {
                    tracing::warn!("Showing note {} without image {}: {}", note.id, key, source);
                    Ok(NoteView::without_image(note))
                }
                CleanupPolicy::Abort => Err(ControllerError::ImageUrl { key, source }),
            },
        }
    }

    pub async fn set_draft(&self, name: String, description: String) {
        self.state.lock().await.set_draft(name, description);
    }

    pub async fn select_file(&self, file: Option<Upload>) {
        self.state.lock().await.select_file(file);
    }

    /// Create a note from the page's draft, uploading the picked file first.
    pub async fn create(&self) -> Result<Outcome, ControllerError> {
        let draft = self.state.lock().await.draft.clone();
        self.create_from(draft).await
    }

    /// Create a note from `submitted`, a form posted with its own fields.
    ///
    /// The page's draft is cleared on success only if it still holds
    /// `submitted`, so a form filled in meanwhile survives.
    pub async fn create_from(&self, submitted: Draft) -> Result<Outcome, ControllerError> {
        if submitted.name.trim().is_empty() {
            tracing::debug!("Ignoring create with blank name");
            return Ok(Outcome::Skipped);
        }

        let image = match submitted.file.clone() {
            Some(file) => {
                let key = storage_key(&self.settings.key_prefix, &file.file_name);
                if let Err(source) = self
                    .backend
                    .storage
                    .upload(&key, file.bytes, &file.content_type)
                    .await
                {
                    tracing::error!("Failed to upload {}: {}", key, source);
                    self.restore_draft_after_failure(submitted).await;
                    return Err(ControllerError::Upload { key, source });
                }
                Some(key)
            }
            None => None,
        };

        let new_note = NewNote {
            name: submitted.name.clone(),
            description: Some(submitted.description.clone())
                .filter(|description| !description.is_empty()),
            image: image.clone(),
        };

        match self.backend.notes.create(new_note).await {
            Ok(note) => {
                tracing::info!("Created note {}", note.id);
                self.state.lock().await.clear_draft_if(&submitted);
                self.refresh().await?;
                Ok(Outcome::Applied)
            }
            Err(source) => {
                tracing::error!("Failed to create note: {}", source);
                if let Some(key) = image {
                    self.discard_orphan(&key).await;
                }
                self.restore_draft_after_failure(submitted).await;
                Err(ControllerError::Create(source))
            }
        }
    }

    async fn discard_orphan(&self, key: &str) {
        match self.settings.policy.orphan {
            OrphanPolicy::Keep => {
                tracing::warn!("Image {} was uploaded but its note was not created", key);
            }
            OrphanPolicy::Remove => match self.backend.storage.remove(key).await {
                Ok(()) => tracing::info!("Removed orphaned image {}", key),
                Err(e) => tracing::warn!("Failed to remove orphaned image {}: {}", key, e),
            },
        }
    }

    async fn restore_draft_after_failure(&self, submitted: Draft) {
        let mut state = self.state.lock().await;
        match self.settings.policy.draft {
            DraftPolicy::Preserve => state.restore_draft(submitted),
            DraftPolicy::Clear => {
                state.clear_draft_if(&submitted);
                state.cancel_edit();
            }
        }
    }

    async fn restore_after_failure(&self) {
        if self.settings.policy.draft == DraftPolicy::Clear {
            let mut state = self.state.lock().await;
            state.clear_draft();
            state.cancel_edit();
        }
    }

    pub async fn start_edit(&self, id: &str) -> Result<(), ControllerError> {
        if self.state.lock().await.start_edit(id) {
            Ok(())
        } else {
            Err(ControllerError::UnknownNote(id.to_string()))
        }
    }

    pub async fn set_edit_fields(
        &self,
        name: String,
        description: String,
    ) -> Result<(), ControllerError> {
        if self.state.lock().await.set_edit_fields(name, description) {
            Ok(())
        } else {
            Err(ControllerError::NotEditing)
        }
    }

    pub async fn cancel_edit(&self) {
        self.state.lock().await.cancel_edit();
    }

    /// Send the open edit form. The image is never resent.
    pub async fn save_edit(&self) -> Result<Outcome, ControllerError> {
        let Some(edit) = self.state.lock().await.editing.clone() else {
            tracing::debug!("Ignoring save with no note being edited");
            return Ok(Outcome::Skipped);
        };

        let update = NoteUpdate {
            id: edit.id.clone(),
            name: Some(edit.name),
            description: Some(edit.description),
        };

        if let Err(source) = self.backend.notes.update(update).await {
            tracing::error!("Failed to update note {}: {}", edit.id, source);
            self.restore_after_failure().await;
            return Err(ControllerError::Update {
                id: edit.id,
                source,
            });
        }

        tracing::info!("Updated note {}", edit.id);
        self.state.lock().await.finish_edit(&edit.id);
        self.refresh().await?;
        Ok(Outcome::Applied)
    }

    /// Delete a listed note, then its image.
    ///
    /// The record stays deleted whatever happens to the image, and the list is
    /// refreshed either way.
    pub async fn delete(&self, id: &str) -> Result<(), ControllerError> {
        let image = {
            let state = self.state.lock().await;
            let view = state
                .find(id)
                .ok_or_else(|| ControllerError::UnknownNote(id.to_string()))?;
            view.note.image.clone()
        };

        self.backend
            .notes
            .delete(id)
            .await
            .map_err(|source| {
                tracing::error!("Failed to delete note {}: {}", id, source);
                ControllerError::Delete {
                    id: id.to_string(),
                    source,
                }
            })?;
        tracing::info!("Deleted note {}", id);
        self.state.lock().await.finish_edit(id);

        let cleanup = match image {
            Some(key) => self
                .backend
                .storage
                .remove(&key)
                .await
                .map_err(|source| ControllerError::BlobCleanup { key, source }),
            None => Ok(()),
        };

        self.refresh().await?;

        match (cleanup, self.settings.policy.cleanup) {
            (Err(e), CleanupPolicy::LogAndContinue) => {
                tracing::warn!("{}", e);
                Ok(())
            }
            (result, _) => result,
        }
    }

    /// End the session and forget everything shown for it.
    pub async fn sign_out(&self) -> Result<(), ControllerError> {
        let result = self
            .backend
            .session
            .sign_out()
            .await
            .map_err(ControllerError::Session);

        *self.state.lock().await = UiState::default();
        result
    }
}
