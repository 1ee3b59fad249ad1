pub mod catalog;
pub mod error;
pub mod loader;
pub mod meteostat;
