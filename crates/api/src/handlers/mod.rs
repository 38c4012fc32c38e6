pub mod analysis;
pub mod documents;
pub mod knowledge;
pub mod legacy;
pub mod market;
pub mod ml;
pub mod recommendation;
pub mod system;
