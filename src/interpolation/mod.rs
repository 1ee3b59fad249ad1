pub mod config;
pub mod engine;
pub mod error;
pub mod idw;
pub mod result;
pub mod selection;
