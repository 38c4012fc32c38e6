//! Success envelope shared by all API handlers.
//!
//! Every success body is `{"success": true, ...payload}` with the payload's
//! fields flattened into the top level, which is the contract the web
//! frontend reads.

use serde::Serialize;

/// `{"success": true, ...T}` response envelope.
///
/// `T` must serialize as a JSON object.
///
/// ```ignore
/// Ok(Json(Success::new(DataPayload { data: items })))
/// ```
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    success: bool,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(payload: T) -> Self {
        Self {
            success: true,
            payload,
        }
    }
}

/// `{"data": T}` payload used by lookup endpoints.
#[derive(Debug, Serialize)]
pub struct DataPayload<T: Serialize> {
    pub data: T,
}

/// Shorthand for `Success::new(DataPayload { data })`.
pub fn data<T: Serialize>(data: T) -> Success<DataPayload<T>> {
    Success::new(DataPayload { data })
}
