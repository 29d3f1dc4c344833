//! On-disk layout draft.
//!
//! The file is a JSON object of string keys, like browser local storage.
//! The layout lives under [`LAYOUT_STORAGE_KEY`] as
//! `{ "widgets": [...], "version": n, "updatedAt": "..." }`. Other keys are
//! left alone.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use fibervision_core::widgets::{WidgetConfig, INITIAL_LAYOUT_VERSION, LAYOUT_STORAGE_KEY};
use serde_json::{Map, Value};

use crate::error::GatewayError;
use crate::gateway::{LayoutGateway, LayoutSnapshot};

/// Stores the layout in a JSON key-value file.
///
/// Unreadable or corrupt data is logged and treated as absent.
#[derive(Debug, Clone)]
pub struct LocalGateway {
    path: PathBuf,
}

impl LocalGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `snapshot` as-is, keeping its version.
    pub async fn store(&self, snapshot: &LayoutSnapshot) -> Result<(), GatewayError> {
        let value = serde_json::to_value(snapshot)
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        let mut entries = self.read_entries().await;
        entries.insert(LAYOUT_STORAGE_KEY.to_string(), value);
        self.write_entries(&entries).await
    }

    /// Read the key-value map. A missing or corrupt file reads as empty.
    async fn read_entries(&self) -> Map<String, Value> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Cannot read layout storage");
                return Map::new();
            }
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                tracing::warn!(path = %self.path.display(), "Layout storage is corrupt, ignoring it");
                Map::new()
            }
        }
    }

    /// Replace the file through a sibling temp file so readers never see a
    /// half-written document.
    async fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), GatewayError> {
        let text = serde_json::to_string_pretty(entries)
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        let io = |e: std::io::Error| GatewayError::Transport(format!("local storage: {e}"));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io)?;
        }
        tokio::fs::write(&tmp, text).await.map_err(io)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io)?;
        Ok(())
    }

    /// The stored layout, or `None` if it is absent or unreadable.
    async fn read_stored(&self) -> Option<LayoutSnapshot> {
        let mut entries = self.read_entries().await;
        let value = entries.remove(LAYOUT_STORAGE_KEY)?;
        match serde_json::from_value::<LayoutSnapshot>(value) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "Stored layout is corrupt, treating it as absent");
                None
            }
        }
    }
}

#[async_trait]
impl LayoutGateway for LocalGateway {
    async fn fetch(&self) -> Result<LayoutSnapshot, GatewayError> {
        Ok(self.read_stored().await.unwrap_or_default())
    }

    async fn save(&self, widgets: &[WidgetConfig]) -> Result<i32, GatewayError> {
        let version = match self.read_stored().await {
            Some(previous) => previous.version + 1,
            None => INITIAL_LAYOUT_VERSION,
        };
        let snapshot = LayoutSnapshot {
            widgets: widgets.to_vec(),
            version,
            updated_at: Some(Utc::now()),
        };
        self.store(&snapshot).await?;
        Ok(snapshot.version)
    }

    async fn clear(&self) -> Result<(), GatewayError> {
        let mut entries = self.read_entries().await;
        if entries.remove(LAYOUT_STORAGE_KEY).is_none() {
            return Ok(());
        }
        self.write_entries(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibervision_core::widgets::{SizePreset, WidgetType};

    fn gateway(dir: &tempfile::TempDir) -> LocalGateway {
        LocalGateway::new(dir.path().join("storage.json"))
    }

    fn widget() -> WidgetConfig {
        WidgetConfig::new(WidgetType::StatCard, "Cameras", SizePreset::Medium.size())
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_v1() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = gateway(&dir).fetch().await.unwrap();
        assert!(snapshot.widgets.is_empty());
        assert_eq!(snapshot.version, 1);
        assert!(snapshot.updated_at.is_none());
    }

    #[tokio::test]
    async fn save_bumps_version_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let local = gateway(&dir);
        let w = widget();

        assert_eq!(local.save(std::slice::from_ref(&w)).await.unwrap(), 1);
        assert_eq!(local.save(std::slice::from_ref(&w)).await.unwrap(), 2);

        let snapshot = local.fetch().await.unwrap();
        assert_eq!(snapshot.version, 2);
        assert_eq!(snapshot.widgets, vec![w]);
        assert!(snapshot.updated_at.is_some());
    }

    #[tokio::test]
    async fn file_uses_the_layout_key_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let local = gateway(&dir);
        tokio::fs::write(local.path(), r#"{"theme":"dark"}"#).await.unwrap();

        local.save(&[widget()]).await.unwrap();

        let text = tokio::fs::read_to_string(local.path()).await.unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value[LAYOUT_STORAGE_KEY]["version"], 1);
        assert!(value[LAYOUT_STORAGE_KEY]["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn corrupt_data_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let local = gateway(&dir);

        tokio::fs::write(local.path(), "{not json").await.unwrap();
        assert_eq!(local.fetch().await.unwrap(), LayoutSnapshot::default());

        let bad_entry = format!(r#"{{"{LAYOUT_STORAGE_KEY}": {{"widgets": 7}}}}"#);
        tokio::fs::write(local.path(), bad_entry).await.unwrap();
        assert_eq!(local.fetch().await.unwrap(), LayoutSnapshot::default());

        // A save over corrupt data starts over.
        assert_eq!(local.save(&[]).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let local = gateway(&dir);
        local.save(&[widget()]).await.unwrap();

        local.clear().await.unwrap();
        local.clear().await.unwrap();
        assert_eq!(local.fetch().await.unwrap(), LayoutSnapshot::default());
        assert_eq!(local.save(&[]).await.unwrap(), 1);
    }
}
