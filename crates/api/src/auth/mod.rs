//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access tokens plus hashed opaque tokens for refresh and email links.

pub mod jwt;
pub mod password;
