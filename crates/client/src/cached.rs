//! In-memory cache in front of a gateway.
//!
//! Concurrent `fetch` calls share one request: the first caller takes the
//! fetch lock and loads, everyone queued behind it re-checks the cache once
//! the lock is released.

use std::time::Duration;

use async_trait::async_trait;
use fibervision_core::widgets::WidgetConfig;
use tokio::sync::Mutex;

use crate::error::GatewayError;
use crate::gateway::{LayoutGateway, LayoutSnapshot};

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);

pub struct CachedGateway<G> {
    inner: G,
    cache: Mutex<Option<LayoutSnapshot>>,
    fetch_lock: Mutex<()>,
    retry_delay: Duration,
}

impl<G: LayoutGateway> CachedGateway<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            cache: Mutex::new(None),
            fetch_lock: Mutex::new(()),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Delay before the single retry of a failed fetch.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Drop the cached snapshot; the next fetch goes to the inner gateway.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    /// Optimistically replace the cached widgets without touching storage.
    ///
    /// The cached version is left as-is until a save reports the new one.
    pub async fn set_local(&self, widgets: Vec<WidgetConfig>) {
        let mut cache = self.cache.lock().await;
        match cache.as_mut() {
            Some(snapshot) => snapshot.widgets = widgets,
            None => {
                *cache = Some(LayoutSnapshot {
                    widgets,
                    ..LayoutSnapshot::default()
                })
            }
        }
    }

    async fn cached(&self) -> Option<LayoutSnapshot> {
        self.cache.lock().await.clone()
    }

    /// Fetch from the inner gateway, retrying once on a retryable failure.
    async fn load(&self) -> Result<LayoutSnapshot, GatewayError> {
        match self.inner.fetch().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) if e.is_retryable() => {
                tracing::debug!(error = %e, delay_ms = self.retry_delay.as_millis() as u64, "Retrying layout fetch");
                tokio::time::sleep(self.retry_delay).await;
                self.inner.fetch().await
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl<G: LayoutGateway> LayoutGateway for CachedGateway<G> {
    async fn fetch(&self) -> Result<LayoutSnapshot, GatewayError> {
        if let Some(snapshot) = self.cached().await {
            return Ok(snapshot);
        }

        let _guard = self.fetch_lock.lock().await;
        // Another caller may have filled the cache while we waited.
        if let Some(snapshot) = self.cached().await {
            return Ok(snapshot);
        }

        let snapshot = self.load().await?;
        *self.cache.lock().await = Some(snapshot.clone());
        Ok(snapshot)
    }

    async fn save(&self, widgets: &[WidgetConfig]) -> Result<i32, GatewayError> {
        let version = self.inner.save(widgets).await?;
        *self.cache.lock().await = Some(LayoutSnapshot {
            widgets: widgets.to_vec(),
            version,
            updated_at: Some(chrono::Utc::now()),
        });
        Ok(version)
    }

    async fn clear(&self) -> Result<(), GatewayError> {
        self.inner.clear().await?;
        *self.cache.lock().await = Some(LayoutSnapshot::default());
        Ok(())
    }
}
