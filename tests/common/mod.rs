#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::StatusCode;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use notes_app::{
    backend::{Backend, BackendError, NoteModel, Session, Storage, memory::MemoryPlatform},
    controller::{ControllerSettings, NotesController, Policy},
    models::{NewNote, Note, NoteUpdate, SignedUrl, Upload, User},
};

/// A backend call as seen by the façade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(NewNote),
    Update(NoteUpdate),
    Delete(String),
    Upload { key: String, content_type: String },
    GetUrl(String),
    Remove(String),
    CurrentUser,
    SignOut,
}

/// Operations that can be told to fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct Failures {
    pub list: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
    pub upload: bool,
    pub get_url: bool,
    pub remove: bool,
}

/// In-memory platform that records every call and fails on request.
pub struct RecordingPlatform {
    pub platform: MemoryPlatform,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<Failures>,
}

impl RecordingPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            platform: MemoryPlatform::new(user()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(Failures::default()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail(&self, update: impl FnOnce(&mut Failures)) {
        update(&mut self.failures.lock().unwrap());
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, failing: impl FnOnce(&Failures) -> bool) -> Result<(), BackendError> {
        if failing(&self.failures.lock().unwrap()) {
            Err(BackendError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "injected failure".into(),
            })
        } else {
            Ok(())
        }
    }

    pub fn backend(self: &Arc<Self>) -> Backend {
        Backend::new(self.clone(), self.clone(), self.clone())
    }
}

#[async_trait]
impl NoteModel for RecordingPlatform {
    async fn list(&self) -> Result<Vec<Note>, BackendError> {
        self.record(Call::List);
        self.check(|f| f.list)?;
        self.platform.list().await
    }

    async fn create(&self, note: NewNote) -> Result<Note, BackendError> {
        self.record(Call::Create(note.clone()));
        self.check(|f| f.create)?;
        self.platform.create(note).await
    }

    async fn update(&self, update: NoteUpdate) -> Result<Note, BackendError> {
        self.record(Call::Update(update.clone()));
        self.check(|f| f.update)?;
        self.platform.update(update).await
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        self.record(Call::Delete(id.to_string()));
        self.check(|f| f.delete)?;
        self.platform.delete(id).await
    }
}

#[async_trait]
impl Storage for RecordingPlatform {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        self.record(Call::Upload {
            key: key.to_string(),
            content_type: content_type.to_string(),
        });
        self.check(|f| f.upload)?;
        self.platform.upload(key, bytes, content_type).await
    }

    async fn get_url(&self, key: &str, expires_in: Duration) -> Result<SignedUrl, BackendError> {
        self.record(Call::GetUrl(key.to_string()));
        self.check(|f| f.get_url)?;
        self.platform.get_url(key, expires_in).await
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.record(Call::Remove(key.to_string()));
        self.check(|f| f.remove)?;
        self.platform.remove(key).await
    }
}

#[async_trait]
impl Session for RecordingPlatform {
    async fn current_user(&self) -> Result<User, BackendError> {
        self.record(Call::CurrentUser);
        self.platform.current_user().await
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.record(Call::SignOut);
        self.platform.sign_out().await
    }
}

pub fn user() -> User {
    User {
        username: "ann".into(),
        login_id: Some("ann@example.com".into()),
    }
}

pub fn image(file_name: &str) -> Upload {
    Upload::new(
        file_name.into(),
        Some("image/png".into()),
        vec![0x89, b'P', b'N', b'G'],
    )
}

pub fn controller_with(policy: Policy) -> (Arc<RecordingPlatform>, NotesController) {
    let platform = RecordingPlatform::new();
    let settings = ControllerSettings {
        policy,
        ..ControllerSettings::default()
    };
    let controller = NotesController::new(platform.backend(), settings);
    (platform, controller)
}

pub fn controller() -> (Arc<RecordingPlatform>, NotesController) {
    controller_with(Policy::default())
}
