//! In-memory gateway for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use fibervision_core::widgets::{WidgetConfig, INITIAL_LAYOUT_VERSION};

use crate::error::GatewayError;
use crate::gateway::{LayoutGateway, LayoutSnapshot};

/// Behaves like the server: absent reads as v1, the first save creates v1
/// and later saves bump the version.
/// Queued failures are returned by the next calls, whatever the operation.
#[derive(Default)]
pub struct ScriptedGateway {
    stored: Mutex<Option<LayoutSnapshot>>,
    failures: Mutex<VecDeque<GatewayError>>,
    fetch_calls: AtomicUsize,
    save_calls: AtomicUsize,
    fetch_delay: Duration,
}

impl ScriptedGateway {
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn fail_next(&self, err: GatewayError) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> Result<(), GatewayError> {
        match self.failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LayoutGateway for ScriptedGateway {
    async fn fetch(&self) -> Result<LayoutSnapshot, GatewayError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        self.take_failure()?;
        Ok(self.stored.lock().unwrap().clone().unwrap_or_default())
    }

    async fn save(&self, widgets: &[WidgetConfig]) -> Result<i32, GatewayError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        let mut stored = self.stored.lock().unwrap();
        let version = stored.as_ref().map_or(INITIAL_LAYOUT_VERSION, |s| s.version + 1);
        *stored = Some(LayoutSnapshot {
            widgets: widgets.to_vec(),
            version,
            updated_at: Some(chrono::Utc::now()),
        });
        Ok(version)
    }

    async fn clear(&self) -> Result<(), GatewayError> {
        self.take_failure()?;
        *self.stored.lock().unwrap() = None;
        Ok(())
    }
}
