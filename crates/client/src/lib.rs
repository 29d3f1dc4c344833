//! Client side of the Fiber Vision dashboard.
//!
//! A [`DashboardSession`] couples the placement engine with a
//! [`LayoutGateway`] that loads and stores the user's widget layout. The
//! gateways stack: [`RemoteGateway`] talks to the API, [`LocalGateway`]
//! keeps a draft on disk, [`LayeredGateway`] combines the two and
//! [`CachedGateway`] shares one in-flight fetch between concurrent callers.

pub mod cached;
pub mod error;
pub mod gateway;
pub mod layered;
pub mod local;
pub mod remote;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use cached::CachedGateway;
pub use error::GatewayError;
pub use gateway::{LayoutGateway, LayoutSnapshot};
pub use layered::LayeredGateway;
pub use local::LocalGateway;
pub use remote::{ClientConfig, RemoteGateway};
pub use session::DashboardSession;
