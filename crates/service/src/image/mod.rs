//! Image backends: anything that takes raw bytes and returns a durable reference.

use std::path::Path;

use async_trait::async_trait;
use rand::Rng;

use crate::errors::ServiceError;

pub mod local;
pub mod remote;

/// Exclusive upper bound of the random part of a storage name.
const SUFFIX_RANGE: u64 = 1_000_000_000_000_000;
const MAX_EXTENSION_LEN: usize = 10;

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Short backend label for logs.
    fn backend(&self) -> &'static str;

    /// Store `bytes` under `storage_name`; returns a path or absolute URL.
    async fn upload(&self, bytes: Vec<u8>, storage_name: &str) -> Result<String, ServiceError>;
}

/// `<unix-millis>-<random><.ext>`; only the client's extension survives.
pub fn storage_name(original_filename: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = rand::thread_rng().gen_range(0..SUFFIX_RANGE);
    format!("{millis}-{suffix}{}", extension_of(original_filename))
}

/// Lowercased `.ext` when it is short and alphanumeric, otherwise empty.
fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= MAX_EXTENSION_LEN && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Storage names must be a single plain path component.
pub(crate) fn check_storage_name(name: &str) -> Result<(), ServiceError> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(ServiceError::Upstream(format!("refusing storage name {name:?}")));
    }
    Ok(())
}
