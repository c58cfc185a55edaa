use serde::{Deserialize, Serialize};

/// What to do when a best-effort step fails: resolving an image link during a
/// refresh, or removing the blob of a deleted note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    #[default]
    LogAndContinue,
    Abort,
}

/// How form fields are left after a failed create or save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftPolicy {
    #[default]
    Preserve,
    Clear,
}

/// Fate of an uploaded image whose note could not be created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    #[default]
    Keep,
    Remove,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub cleanup: CleanupPolicy,
    #[serde(default)]
    pub draft: DraftPolicy,
    #[serde(default)]
    pub orphan: OrphanPolicy,
}
