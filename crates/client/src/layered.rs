//! Remote store with a local draft underneath.

use async_trait::async_trait;
use chrono::Utc;
use fibervision_core::widgets::WidgetConfig;

use crate::error::GatewayError;
use crate::gateway::{LayoutGateway, LayoutSnapshot};
use crate::local::LocalGateway;

/// Reads and writes go to `remote` first; the local file mirrors every
/// successful remote call and stands in while the remote is unreachable.
///
/// An [`GatewayError::Unauthenticated`] answer is never papered over with
/// local data.
pub struct LayeredGateway<R> {
    local: LocalGateway,
    remote: R,
}

impl<R: LayoutGateway> LayeredGateway<R> {
    pub fn new(local: LocalGateway, remote: R) -> Self {
        Self { local, remote }
    }

    pub fn local(&self) -> &LocalGateway {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    fn can_fall_back(err: &GatewayError) -> bool {
        !matches!(err, GatewayError::Unauthenticated)
    }
}

#[async_trait]
impl<R: LayoutGateway> LayoutGateway for LayeredGateway<R> {
    async fn fetch(&self) -> Result<LayoutSnapshot, GatewayError> {
        match self.remote.fetch().await {
            Ok(snapshot) => {
                if let Err(e) = self.local.store(&snapshot).await {
                    tracing::warn!(error = %e, "Failed to mirror layout locally");
                }
                Ok(snapshot)
            }
            Err(e) if Self::can_fall_back(&e) => {
                tracing::warn!(error = %e, "Remote layout unavailable, using local draft");
                self.local.fetch().await
            }
            Err(e) => Err(e),
        }
    }

    async fn save(&self, widgets: &[WidgetConfig]) -> Result<i32, GatewayError> {
        match self.remote.save(widgets).await {
            Ok(version) => {
                let snapshot = LayoutSnapshot {
                    widgets: widgets.to_vec(),
                    version,
                    updated_at: Some(Utc::now()),
                };
                if let Err(e) = self.local.store(&snapshot).await {
                    tracing::warn!(error = %e, "Failed to mirror saved layout locally");
                }
                Ok(version)
            }
            Err(e) => {
                // Keep the draft so the next fetch without a server still
                // shows the user's work. The caller still sees the failure.
                if Self::can_fall_back(&e) {
                    if let Err(local_err) = self.local.save(widgets).await {
                        tracing::warn!(error = %local_err, "Failed to keep local draft");
                    }
                }
                Err(e)
            }
        }
    }

    async fn clear(&self) -> Result<(), GatewayError> {
        let remote = self.remote.clear().await;
        match &remote {
            Err(e) if !Self::can_fall_back(e) => {}
            _ => self.local.clear().await?,
        }
        remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGateway;
    use fibervision_core::widgets::{SizePreset, WidgetType};
    use std::sync::Arc;

    fn widget(title: &str) -> WidgetConfig {
        WidgetConfig::new(WidgetType::StatCard, title, SizePreset::Small.size())
    }

    fn setup(dir: &tempfile::TempDir) -> (Arc<ScriptedGateway>, LayeredGateway<Arc<ScriptedGateway>>) {
        let remote = Arc::new(ScriptedGateway::default());
        let local = LocalGateway::new(dir.path().join("storage.json"));
        (remote.clone(), LayeredGateway::new(local, remote))
    }

    #[tokio::test]
    async fn remote_fetch_is_mirrored_locally() {
        let dir = tempfile::tempdir().unwrap();
        let (remote, layered) = setup(&dir);
        remote.save(&[widget("A")]).await.unwrap();

        let snapshot = layered.fetch().await.unwrap();
        assert_eq!(snapshot.version, 1);

        let mirrored = layered.local().fetch().await.unwrap();
        assert_eq!(mirrored.widgets, snapshot.widgets);
        assert_eq!(mirrored.version, 1);
    }

    #[tokio::test]
    async fn transport_failure_falls_back_to_local() {
        let dir = tempfile::tempdir().unwrap();
        let (remote, layered) = setup(&dir);
        layered.save(&[widget("A")]).await.unwrap();

        remote.fail_next(GatewayError::Transport("connection refused".into()));
        let snapshot = layered.fetch().await.unwrap();
        assert_eq!(snapshot.widgets.len(), 1);
        assert_eq!(snapshot.version, 1);
    }

    #[tokio::test]
    async fn unauthenticated_is_not_masked() {
        let dir = tempfile::tempdir().unwrap();
        let (remote, layered) = setup(&dir);
        layered.save(&[widget("A")]).await.unwrap();

        remote.fail_next(GatewayError::Unauthenticated);
        assert_eq!(layered.fetch().await.unwrap_err(), GatewayError::Unauthenticated);
    }

    #[tokio::test]
    async fn failed_remote_save_keeps_local_draft() {
        let dir = tempfile::tempdir().unwrap();
        let (remote, layered) = setup(&dir);

        remote.fail_next(GatewayError::Server { status: 503, message: "down".into() });
        let err = layered.save(&[widget("Draft")]).await.unwrap_err();
        assert!(err.is_retryable());

        let draft = layered.local().fetch().await.unwrap();
        assert_eq!(draft.widgets[0].title, "Draft");
        assert_eq!(remote.fetch().await.unwrap(), LayoutSnapshot::default());
    }

    #[tokio::test]
    async fn clear_empties_both_stores() {
        let dir = tempfile::tempdir().unwrap();
        let (remote, layered) = setup(&dir);
        layered.save(&[widget("A")]).await.unwrap();

        layered.clear().await.unwrap();
        layered.clear().await.unwrap();

        assert_eq!(remote.fetch().await.unwrap(), LayoutSnapshot::default());
        assert_eq!(layered.local().fetch().await.unwrap(), LayoutSnapshot::default());
    }
}
