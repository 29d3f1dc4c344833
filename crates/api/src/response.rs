//! Shared response envelope types for API handlers.
//!
//! Resource endpoints answer with a `{ "data": ... }` envelope. The dashboard
//! layout endpoints keep their own flat wire shape (see
//! [`crate::handlers::dashboard`]).

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
