//! Settings store backends: remote HTTP, host-provided, and local files.

mod host;
mod local;
mod remote;

pub use host::HostSettingsStore;
pub use local::LocalFileSettingsStore;
pub use remote::HttpSettingsStore;

use std::path::Path;

/// Write `bytes` to a sibling temp file, then rename it over `path`.
pub(crate) async fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    tokio::fs::write(&temp_path, bytes).await?;
    if let Err(error) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(error);
    }
    Ok(())
}
