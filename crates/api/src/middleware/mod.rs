//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the user behind a JWT Bearer token.
//! - [`auth::MaybeAuthUser`] -- same, but anonymous requests pass through.
//! - [`rbac`] -- per-permission extractors backed by the role grants.

pub mod auth;
pub mod rbac;
