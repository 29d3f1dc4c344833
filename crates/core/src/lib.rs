//! Domain logic for the Fiber Vision dashboard.
//!
//! No I/O lives here: the database, HTTP and client crates build on these
//! types.

pub mod auth_rules;
pub mod error;
pub mod grid;
pub mod navigation;
pub mod registry;
pub mod render;
pub mod roles;
pub mod types;
pub mod widgets;
