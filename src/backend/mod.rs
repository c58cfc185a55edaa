//! Access façade for the managed backend: note records, blob storage and the
//! signed-in session.

mod error;
pub mod http;
pub mod memory;
mod outputs;

pub use error::BackendError;
pub use outputs::{AuthOutputs, BackendOutputs, DataOutputs, StorageOutputs};

use async_trait::async_trait;

use std::{sync::Arc, time::Duration};

use crate::models::{NewNote, Note, NoteUpdate, SignedUrl, User};

/// Owner-scoped note records. The backend decides who the owner is.
#[async_trait]
pub trait NoteModel: Send + Sync {
    async fn list(&self) -> Result<Vec<Note>, BackendError>;

    async fn create(&self, note: NewNote) -> Result<Note, BackendError>;

    async fn update(&self, update: NoteUpdate) -> Result<Note, BackendError>;

    async fn delete(&self, id: &str) -> Result<(), BackendError>;
}

/// Blob storage addressed by caller-chosen keys.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Returns once the blob is committed.
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str)
    -> Result<(), BackendError>;

    /// Issue a link that stays valid for `expires_in`.
    async fn get_url(&self, key: &str, expires_in: Duration) -> Result<SignedUrl, BackendError>;

    async fn remove(&self, key: &str) -> Result<(), BackendError>;
}

#[async_trait]
pub trait Session: Send + Sync {
    async fn current_user(&self) -> Result<User, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;
}

/// The configured backend. Built once at startup and cloned freely afterwards.
#[derive(Clone)]
pub struct Backend {
    pub notes: Arc<dyn NoteModel>,
    pub storage: Arc<dyn Storage>,
    pub session: Arc<dyn Session>,
    /// Set when blobs live in this process and their links point back at the app.
    pub blob_host: Option<memory::MemoryPlatform>,
}

impl Backend {
    pub fn new(
        notes: Arc<dyn NoteModel>,
        storage: Arc<dyn Storage>,
        session: Arc<dyn Session>,
    ) -> Self {
        Self {
            notes,
            storage,
            session,
            blob_host: None,
        }
    }

    /// Wire the façade to a remote deployment described by `outputs`.
    pub fn configure(
        outputs: &BackendOutputs,
        settings: &http::ClientSettings,
    ) -> Result<Self, BackendError> {
        let client = http::RemoteClient::new(settings)?;

        let notes = http::HttpNoteModel::new(client.clone(), &outputs.data)?;
        let storage = http::HttpStorage::new(client.clone(), &outputs.storage)?;
        let session = http::HttpSession::new(client, &outputs.auth)?;

        tracing::info!(
            "Backend configured: data at {}, storage bucket '{}'",
            outputs.data.url,
            outputs.storage.bucket_name
        );

        Ok(Self::new(Arc::new(notes), Arc::new(storage), Arc::new(session)))
    }

    /// A process-local backend signed in as `user`.
    pub fn in_memory(user: User) -> Self {
        let platform = memory::MemoryPlatform::new(user);
        tracing::info!("Using in-memory backend");
        Self {
            blob_host: Some(platform.clone()),
            ..Self::new(
                Arc::new(platform.clone()),
                Arc::new(platform.clone()),
                Arc::new(platform),
            )
        }
    }
}
