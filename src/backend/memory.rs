//! Process-local stand-in for the managed platform, used for local runs and tests.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use super::{BackendError, NoteModel, Session, Storage};
use crate::models::{NewNote, Note, NoteUpdate, SignedUrl, User};

struct StoredNote {
    owner: String,
    note: Note,
}

struct StoredBlob {
    owner: String,
    content_type: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct Inner {
    user: Option<User>,
    // Insertion order is the listing order.
    notes: Vec<StoredNote>,
    blobs: HashMap<String, StoredBlob>,
    // Latest link expiry issued per key, as a unix timestamp.
    links: HashMap<String, i64>,
}

/// Implements every façade trait over shared in-memory state.
///
/// Records and blobs are scoped to the signed-in username, mirroring the
/// owner rule of the hosted data service.
#[derive(Clone)]
pub struct MemoryPlatform {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryPlatform {
    pub fn new(user: User) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                user: Some(user),
                ..Inner::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new session, as the hosted sign-in flow would.
    pub fn sign_in(&self, user: User) {
        self.lock().user = Some(user);
    }

    /// Stored bytes and content type of a blob, regardless of owner.
    pub fn blob(&self, key: &str) -> Option<(String, Vec<u8>)> {
        self.lock()
            .blobs
            .get(key)
            .map(|blob| (blob.content_type.clone(), blob.bytes.clone()))
    }

    pub fn blob_count(&self) -> usize {
        self.lock().blobs.len()
    }

    /// Content type and bytes behind a link issued by `get_url`.
    ///
    /// `expires` must not be past, nor later than any expiry issued for `key`.
    pub fn signed_blob(
        &self,
        key: &str,
        expires: i64,
    ) -> Result<(String, Vec<u8>), BackendError> {
        let inner = self.lock();

        let issued = inner
            .links
            .get(key)
            .copied()
            .ok_or_else(|| BackendError::NotFound(format!("blob {key}")))?;
        if expires > issued || expires < Utc::now().timestamp() {
            return Err(BackendError::Forbidden(format!("link to blob {key}")));
        }

        inner
            .blobs
            .get(key)
            .map(|blob| (blob.content_type.clone(), blob.bytes.clone()))
            .ok_or_else(|| BackendError::NotFound(format!("blob {key}")))
    }
}

/// Path prefix the application serves memory blobs under.
pub const BLOB_ROUTE: &str = "/blobs";

fn blob_link(key: &str, expires: i64) -> Result<String, BackendError> {
    let mut url = Url::parse("http://localhost")
        .map_err(|e| BackendError::Config(format!("invalid blob link base: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| BackendError::Config("blob link base cannot be a base".into()))?
        .clear()
        .push(BLOB_ROUTE.trim_start_matches('/'))
        .extend(key.split('/'));
    Ok(format!("{}?expires={expires}", url.path()))
}

fn owner(inner: &Inner) -> Result<String, BackendError> {
    inner
        .user
        .as_ref()
        .map(|user| user.username.clone())
        .ok_or(BackendError::Unauthorized)
}

#[async_trait]
impl NoteModel for MemoryPlatform {
    async fn list(&self) -> Result<Vec<Note>, BackendError> {
        let inner = self.lock();
        let owner = owner(&inner)?;

        Ok(inner
            .notes
            .iter()
            .filter(|stored| stored.owner == owner)
            .map(|stored| stored.note.clone())
            .collect())
    }

    async fn create(&self, note: NewNote) -> Result<Note, BackendError> {
        let mut inner = self.lock();
        let owner = owner(&inner)?;

        let note = Note {
            id: uuid::Uuid::new_v4().to_string(),
            name: note.name,
            description: note.description,
            image: note.image,
        };
        inner.notes.push(StoredNote {
            owner,
            note: note.clone(),
        });

        Ok(note)
    }

    async fn update(&self, update: NoteUpdate) -> Result<Note, BackendError> {
        let mut inner = self.lock();
        let owner = owner(&inner)?;

        let stored = inner
            .notes
            .iter_mut()
            .find(|stored| stored.owner == owner && stored.note.id == update.id)
            .ok_or_else(|| BackendError::NotFound(format!("note {}", update.id)))?;

        if let Some(name) = update.name {
            stored.note.name = name;
        }
        if let Some(description) = update.description {
            stored.note.description = Some(description);
        }

        Ok(stored.note.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        let mut inner = self.lock();
        let owner = owner(&inner)?;

        let position = inner
            .notes
            .iter()
            .position(|stored| stored.owner == owner && stored.note.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("note {id}")))?;
        inner.notes.remove(position);

        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryPlatform {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let mut inner = self.lock();
        let owner = owner(&inner)?;

        if inner.blobs.get(key).is_some_and(|blob| blob.owner != owner) {
            return Err(BackendError::Forbidden(format!("blob {key}")));
        }
        inner.blobs.insert(
            key.to_string(),
            StoredBlob {
                owner,
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(())
    }

    async fn get_url(&self, key: &str, expires_in: Duration) -> Result<SignedUrl, BackendError> {
        let mut inner = self.lock();
        let owner = owner(&inner)?;

        match inner.blobs.get(key).map(|blob| blob.owner == owner) {
            Some(true) => {
                let ttl = chrono::Duration::from_std(expires_in)
                    .map_err(|e| BackendError::Config(format!("invalid url expiry: {e}")))?;
                let expires_at = Utc::now() + ttl;
                let expires = expires_at.timestamp();

                let issued = inner.links.entry(key.to_string()).or_insert(expires);
                *issued = (*issued).max(expires);

                Ok(SignedUrl {
                    url: blob_link(key, expires)?,
                    expires_at,
                })
            }
            Some(false) => Err(BackendError::Forbidden(format!("blob {key}"))),
            None => Err(BackendError::NotFound(format!("blob {key}"))),
        }
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        let mut inner = self.lock();
        let owner = owner(&inner)?;

        match inner.blobs.get(key).map(|blob| blob.owner == owner) {
            Some(true) => {
                inner.blobs.remove(key);
                inner.links.remove(key);
                Ok(())
            }
            Some(false) => Err(BackendError::Forbidden(format!("blob {key}"))),
            None => Err(BackendError::NotFound(format!("blob {key}"))),
        }
    }
}

#[async_trait]
impl Session for MemoryPlatform {
    async fn current_user(&self) -> Result<User, BackendError> {
        self.lock().user.clone().ok_or(BackendError::Unauthorized)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.lock().user = None;
        Ok(())
    }
}
