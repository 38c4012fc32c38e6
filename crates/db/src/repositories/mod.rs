//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod npk_reading_repo;

pub use npk_reading_repo::NpkReadingRepo;
