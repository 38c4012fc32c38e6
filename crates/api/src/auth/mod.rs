//! Bearer-token authentication.
//!
//! Tokens are issued by the external identity provider; this service only
//! validates them. [`jwt::generate_access_token`] exists for tests and tooling.

pub mod jwt;
