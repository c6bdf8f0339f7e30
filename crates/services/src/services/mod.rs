pub mod exchange;
pub mod generator;
