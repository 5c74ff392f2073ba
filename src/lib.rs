pub mod classifier;
pub mod driver;
pub mod embedding;
pub mod filter;
pub mod plot;
pub mod projection;
pub mod windowing;
