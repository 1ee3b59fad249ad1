pub mod date_range;
pub mod observation;
pub mod parameter;
pub mod point;
pub mod station;
pub mod target;
