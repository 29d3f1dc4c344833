use async_trait::async_trait;
use fibervision_core::widgets::{DashboardLayout, WidgetConfig};

use crate::error::GatewayError;

/// A fetched layout: widgets, version and last update time.
///
/// An absent layout is `LayoutSnapshot::default()`: no widgets, version 1.
pub type LayoutSnapshot = DashboardLayout;

/// Where a user's layout lives.
///
/// Every call replaces or reads the whole layout; there are no partial
/// updates and no version check, so the last writer wins.
#[async_trait]
pub trait LayoutGateway: Send + Sync {
    /// Current layout, or the empty version-1 layout if none is stored.
    async fn fetch(&self) -> Result<LayoutSnapshot, GatewayError>;

    /// Replace the stored layout and return its new version.
    async fn save(&self, widgets: &[WidgetConfig]) -> Result<i32, GatewayError>;

    /// Delete the stored layout. Deleting an absent layout succeeds.
    async fn clear(&self) -> Result<(), GatewayError>;
}

#[async_trait]
impl<G: LayoutGateway + ?Sized> LayoutGateway for std::sync::Arc<G> {
    async fn fetch(&self) -> Result<LayoutSnapshot, GatewayError> {
        (**self).fetch().await
    }

    async fn save(&self, widgets: &[WidgetConfig]) -> Result<i32, GatewayError> {
        (**self).save(widgets).await
    }

    async fn clear(&self) -> Result<(), GatewayError> {
        (**self).clear().await
    }
}
