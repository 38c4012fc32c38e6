//! Authentication extractors.
//!
//! - [`auth::AuthUser`] -- requires a valid Bearer token.
//! - [`auth::MaybeAuthUser`] -- accepts anonymous callers.

pub mod auth;
