//! Host-provided key/value settings store.
//!
//! The embedding host owns persistence; this adapter models it as a shared
//! map keyed by portal id, optionally mirrored to a single JSON file so that
//! a host process can hand over its store between runs.

use quick_links_ports::{BoxFuture, PortalId, SettingsDocument, SettingsStorePort};
use quick_links_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

type HostEntries = BTreeMap<String, Value>;

/// Settings store backed by a host key/value map.
#[derive(Debug, Clone, Default)]
pub struct HostSettingsStore {
    entries: Arc<RwLock<HostEntries>>,
    backing_file: Option<PathBuf>,
    open_error: Option<ErrorEnvelope>,
}

impl HostSettingsStore {
    /// Purely in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// In-memory store seeded with raw documents (any historical layout).
    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = (PortalId, Value)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(portal_id, document)| (portal_id.as_str().to_owned(), document))
            .collect();
        Self {
            entries: Arc::new(RwLock::new(entries)),
            backing_file: None,
            open_error: None,
        }
    }

    /// Store mirrored to `path`, a JSON object keyed by portal id.
    ///
    /// A missing file starts empty; it is created on the first save. A file
    /// that cannot be read or decoded does not fail here: every load and
    /// save reports that error instead, and the file is left untouched.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (entries, open_error) = match read_entries(&path).await {
            Ok(entries) => (entries, None),
            Err(error) => (HostEntries::new(), Some(error)),
        };
        Self {
            entries: Arc::new(RwLock::new(entries)),
            backing_file: Some(path),
            open_error,
        }
    }

    /// Number of portals with a stored document.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn usable(&self) -> Result<()> {
        self.open_error.clone().map_or(Ok(()), Err)
    }

    async fn persist(&self, entries: &HostEntries) -> Result<()> {
        let Some(path) = self.backing_file.as_deref() else {
            return Ok(());
        };
        let encoded = serde_json::to_vec_pretty(entries).map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::internal(),
                format!("failed to encode host store: {error}"),
                ErrorClass::NonRetriable,
            )
        })?;
        super::write_atomically(path, &encoded)
            .await
            .map_err(|error| io_error(path, error))
    }
}

impl SettingsStorePort for HostSettingsStore {
    fn backend_name(&self) -> &'static str {
        "host"
    }

    fn load(
        &self,
        _ctx: &RequestContext,
        portal_id: &PortalId,
    ) -> BoxFuture<'_, Result<Option<Value>>> {
        let key = portal_id.as_str().to_owned();
        Box::pin(async move {
            self.usable()?;
            Ok(self.entries.read().await.get(&key).cloned())
        })
    }

    fn save(
        &self,
        _ctx: &RequestContext,
        portal_id: &PortalId,
        document: SettingsDocument,
    ) -> BoxFuture<'_, Result<()>> {
        let key = portal_id.as_str().to_owned();
        Box::pin(async move {
            self.usable()?;
            let encoded = serde_json::to_value(&document).map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::internal(),
                    format!("failed to encode settings: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

            // Holding the write guard across the file write keeps the map and
            // the mirror in the same order.
            let mut entries = self.entries.write().await;
            let previous = entries.insert(key.clone(), encoded);
            if let Err(error) = self.persist(&entries).await {
                match previous {
                    Some(previous) => entries.insert(key, previous),
                    None => entries.remove(&key),
                };
                return Err(error);
            }
            Ok(())
        })
    }
}

async fn read_entries(path: &Path) -> Result<HostEntries> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(HostEntries::new()),
        Err(error) => return Err(io_error(path, error)),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(HostEntries::new());
    }
    // Entries are raw documents; whatever shape they have is the migrator's concern.
    serde_json::from_slice(&bytes).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("adapter", "host_store_corrupt"),
            format!("host store is not a JSON object keyed by portal: {error}"),
        )
        .with_metadata("path", path.display().to_string())
    })
}

fn io_error(path: &Path, error: std::io::Error) -> ErrorEnvelope {
    ErrorEnvelope::from(error).with_metadata("path", path.display().to_string())
}
