//! Façade implementation for a remote deployment, spoken over HTTP.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, Url, header};
use serde::{Deserialize, Serialize};

use std::{
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

use super::{AuthOutputs, BackendError, DataOutputs, NoteModel, Session, Storage, StorageOutputs};
use crate::models::{NewNote, Note, NoteUpdate, SignedUrl, User};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Session token issued by the identity provider
    pub access_token: Option<String>,
    pub request_timeout: Duration,
}

/// HTTP client shared by the three remote collaborators, carrying the session token.
#[derive(Clone)]
pub struct RemoteClient {
    http: Client,
    token: Arc<RwLock<Option<String>>>,
}

impl RemoteClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, BackendError> {
        let http = Client::builder().timeout(settings.request_timeout).build()?;

        Ok(Self {
            http,
            token: Arc::new(RwLock::new(settings.access_token.clone())),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, BackendError> {
        let token = self.token.read().unwrap_or_else(PoisonError::into_inner);
        token
            .as_deref()
            .map(|token| request.bearer_auth(token))
            .ok_or(BackendError::Unauthorized)
    }

    fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn parse_base(url: &str) -> Result<Url, BackendError> {
    Url::parse(url).map_err(|e| BackendError::Config(format!("invalid endpoint '{url}': {e}")))
}

/// Append path segments to `base`, percent-encoding each one.
fn endpoint<'a>(
    base: &Url,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url, BackendError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| BackendError::Config(format!("endpoint '{base}' cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Link lifetime in whole seconds, rounded up so a short expiry never becomes zero.
fn ttl_secs(expires_in: Duration) -> u64 {
    expires_in.as_secs() + u64::from(expires_in.subsec_nanos() > 0)
}

async fn expect_success(resource: &str, response: Response) -> Result<Response, BackendError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(BackendError::from_response(resource, response).await)
    }
}

pub struct HttpNoteModel {
    client: RemoteClient,
    base: Url,
}

impl HttpNoteModel {
    pub fn new(client: RemoteClient, outputs: &DataOutputs) -> Result<Self, BackendError> {
        Ok(Self {
            client,
            base: parse_base(&outputs.url)?,
        })
    }

    fn note_url(&self, id: &str) -> Result<Url, BackendError> {
        endpoint(&self.base, ["notes", id])
    }
}

#[async_trait]
impl NoteModel for HttpNoteModel {
    async fn list(&self) -> Result<Vec<Note>, BackendError> {
        let url = endpoint(&self.base, ["notes"])?;
        let request = self.client.authorized(self.client.http.get(url))?;
        let response = expect_success("notes", request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, note: NewNote) -> Result<Note, BackendError> {
        let url = endpoint(&self.base, ["notes"])?;
        let request = self.client.authorized(self.client.http.post(url).json(&note))?;
        let response = expect_success("notes", request.send().await?).await?;
        let created: Note = response.json().await?;

        tracing::debug!("Created note {}", created.id);
        Ok(created)
    }

    async fn update(&self, update: NoteUpdate) -> Result<Note, BackendError> {
        let url = self.note_url(&update.id)?;
        let resource = format!("note {}", update.id);
        let request = self
            .client
            .authorized(self.client.http.patch(url).json(&update))?;
        let response = expect_success(&resource, request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        let url = self.note_url(id)?;
        let request = self.client.authorized(self.client.http.delete(url))?;
        expect_success(&format!("note {id}"), request.send().await?).await?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct PresignRequest<'a> {
    key: &'a str,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct PresignResponse {
    url: String,
    expires_at: DateTime<Utc>,
}

pub struct HttpStorage {
    client: RemoteClient,
    bucket: Url,
}

impl HttpStorage {
    pub fn new(client: RemoteClient, outputs: &StorageOutputs) -> Result<Self, BackendError> {
        let bucket = endpoint(&parse_base(&outputs.url)?, [outputs.bucket_name.as_str()])?;
        Ok(Self { client, bucket })
    }

    fn object_url(&self, key: &str) -> Result<Url, BackendError> {
        endpoint(&self.bucket, key.split('/'))
    }
}

#[async_trait]
impl Storage for HttpStorage {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let size = bytes.len();
        let request = self.client.authorized(
            self.client
                .http
                .put(self.object_url(key)?)
                .header(header::CONTENT_TYPE, content_type)
                .body(bytes),
        )?;
        expect_success(&format!("blob {key}"), request.send().await?).await?;

        tracing::debug!("Uploaded blob {} ({} bytes, {})", key, size, content_type);
        Ok(())
    }

    async fn get_url(&self, key: &str, expires_in: Duration) -> Result<SignedUrl, BackendError> {
        let url = endpoint(&self.bucket, ["presign"])?;
        let body = PresignRequest {
            key,
            expires_in: ttl_secs(expires_in),
        };
        let request = self.client.authorized(self.client.http.post(url).json(&body))?;
        let response = expect_success(&format!("blob {key}"), request.send().await?).await?;
        let signed: PresignResponse = response.json().await?;

        Ok(SignedUrl {
            url: signed.url,
            expires_at: signed.expires_at,
        })
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        let request = self
            .client
            .authorized(self.client.http.delete(self.object_url(key)?))?;
        expect_success(&format!("blob {key}"), request.send().await?).await?;
        Ok(())
    }
}

pub struct HttpSession {
    client: RemoteClient,
    base: Url,
}

impl HttpSession {
    pub fn new(client: RemoteClient, outputs: &AuthOutputs) -> Result<Self, BackendError> {
        Ok(Self {
            client,
            base: parse_base(&outputs.url)?,
        })
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn current_user(&self) -> Result<User, BackendError> {
        let url = endpoint(&self.base, ["user"])?;
        let request = self.client.authorized(self.client.http.get(url))?;
        let response = expect_success("user", request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        if !self.client.has_token() {
            return Ok(());
        }

        let url = endpoint(&self.base, ["sign-out"])?;
        let request = self.client.authorized(self.client.http.post(url))?;
        let result = request.send().await;

        // The local session ends whatever the identity provider answers.
        self.client.clear_token();

        expect_success("session", result?).await?;
        tracing::info!("Signed out");
        Ok(())
    }
}
