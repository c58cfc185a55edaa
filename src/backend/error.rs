use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Not signed in or session expired")]
    Unauthorized,

    #[error("Access to {0} denied")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Backend responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Invalid backend configuration: {0}")]
    Config(String),
}

impl BackendError {
    /// Map a non-success response onto an error, naming the resource for 403/404.
    pub async fn from_response(resource: &str, response: reqwest::Response) -> Self {
        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden(resource.to_string()),
            StatusCode::NOT_FOUND => Self::NotFound(resource.to_string()),
            _ => Self::Status {
                status,
                body: response.text().await.unwrap_or_default(),
            },
        }
    }
}
