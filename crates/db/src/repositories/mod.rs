//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod dashboard_layout_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;
pub mod verification_token_repo;

pub use dashboard_layout_repo::DashboardLayoutRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use verification_token_repo::VerificationTokenRepo;
