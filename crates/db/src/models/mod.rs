//! Row structs and DTOs.
//!
//! Each submodule holds a `FromRow` struct matching its table plus the
//! input DTOs the repositories accept.

pub mod dashboard_layout;
pub mod role;
pub mod session;
pub mod user;
pub mod verification_token;
