pub mod coefficients;
pub mod error;
pub mod locations;
pub mod observations;
mod reader;
