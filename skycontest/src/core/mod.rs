pub mod app;
pub mod config;
pub mod platform;
pub mod rendering;
pub mod time;
pub mod windowing;
