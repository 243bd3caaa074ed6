//! Settings store writing one JSON file per portal on local storage.

use quick_links_ports::{BoxFuture, PortalId, SettingsDocument, SettingsStorePort};
use quick_links_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Stores `{directory}/{portalId}.json`.
#[derive(Debug, Clone)]
pub struct LocalFileSettingsStore {
    directory: PathBuf,
}

impl LocalFileSettingsStore {
    /// Create a store rooted at `directory` (created lazily on first save).
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Root directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File holding the document for `portal_id`.
    ///
    /// Portal ids are opaque, so every byte outside `[A-Za-z0-9_-]` is
    /// written as `%XX`. The mapping is injective and keeps the file
    /// inside the directory.
    #[must_use]
    pub fn document_path(&self, portal_id: &PortalId) -> PathBuf {
        let mut file_stem = String::with_capacity(portal_id.as_str().len());
        for byte in portal_id.as_str().bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                file_stem.push(char::from(byte));
            } else {
                let _ = write!(file_stem, "%{byte:02X}");
            }
        }
        self.directory.join(format!("{file_stem}.json"))
    }

    async fn read_document(&self, portal_id: &PortalId) -> Result<Option<serde_json::Value>> {
        let path = self.document_path(portal_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(with_path(error.into(), &path)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        // Unparseable content is handed to the migrator as a string so that
        // it falls back to defaults instead of failing the load.
        Ok(Some(serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })))
    }

    async fn write_document(&self, portal_id: &PortalId, document: &SettingsDocument) -> Result<()> {
        let path = self.document_path(portal_id);
        let mut encoded = serde_json::to_vec_pretty(document).map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::internal(),
                format!("failed to encode settings: {error}"),
                ErrorClass::NonRetriable,
            )
        })?;
        encoded.push(b'\n');

        super::write_atomically(&path, &encoded)
            .await
            .map_err(|error| with_path(error.into(), &path))
    }
}

impl SettingsStorePort for LocalFileSettingsStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    fn load(
        &self,
        _ctx: &RequestContext,
        portal_id: &PortalId,
    ) -> BoxFuture<'_, Result<Option<serde_json::Value>>> {
        let portal_id = portal_id.clone();
        Box::pin(async move { self.read_document(&portal_id).await })
    }

    fn save(
        &self,
        _ctx: &RequestContext,
        portal_id: &PortalId,
        document: SettingsDocument,
    ) -> BoxFuture<'_, Result<()>> {
        let portal_id = portal_id.clone();
        Box::pin(async move { self.write_document(&portal_id, &document).await })
    }
}

fn with_path(error: ErrorEnvelope, path: &Path) -> ErrorEnvelope {
    error.with_metadata("path", path.display().to_string())
}
