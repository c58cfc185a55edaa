use uuid::Uuid;

/// Storage key for a newly picked file: `<prefix><random uuid>-<file name>`.
///
/// Only the last path component of `file_name` is kept.
pub fn storage_key(prefix: &str, file_name: &str) -> String {
    let base_name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    format!("{prefix}{}-{base_name}", Uuid::new_v4())
}
