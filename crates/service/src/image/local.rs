use std::path::PathBuf;

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

use super::{check_storage_name, ImageHost};
use crate::errors::ServiceError;

/// Writes images under a directory that the HTTP layer serves read-only.
#[derive(Clone, Debug)]
pub struct LocalDiskHost {
    dir: PathBuf,
    public_path: String,
}

impl LocalDiskHost {
    /// `public_path` is the URL prefix the directory is mounted at, e.g. `/uploads`.
    pub fn new<P: Into<PathBuf>>(dir: P, public_path: &str) -> Self {
        Self { dir: dir.into(), public_path: public_path.trim_end_matches('/').to_string() }
    }

    pub fn dir(&self) -> &std::path::Path { &self.dir }
}

#[async_trait]
impl ImageHost for LocalDiskHost {
    fn backend(&self) -> &'static str { "local" }

    async fn upload(&self, bytes: Vec<u8>, storage_name: &str) -> Result<String, ServiceError> {
        check_storage_name(storage_name)?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ServiceError::Upstream(format!("create {}: {e}", self.dir.display())))?;

        let path = self.dir.join(storage_name);
        // create_new: a name collision fails instead of clobbering another upload
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| ServiceError::Upstream(format!("open {}: {e}", path.display())))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| ServiceError::Upstream(format!("write {}: {e}", path.display())))?;
        file.flush()
            .await
            .map_err(|e| ServiceError::Upstream(format!("flush {}: {e}", path.display())))?;

        debug!(path = %path.display(), size = bytes.len(), "image_written");
        Ok(format!("{}/{}", self.public_path, storage_name))
    }
}
