pub mod config;
pub mod loader;
pub mod math;
pub mod render;
pub mod skeleton;
