pub mod bwd;
pub mod error;
pub mod fertilizer;
pub mod knowledge;
pub mod leaf_color;
pub mod market;
pub mod models;
pub mod npk;
pub mod numeric;
pub mod predictions;
pub mod types;
pub mod uploads;
pub mod yield_plan;
