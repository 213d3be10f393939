pub mod actuator;
pub mod api;
pub mod core;
pub mod streaming;
pub mod tactile;
