pub mod common;
pub mod config;
pub mod document;
pub mod render;
pub mod xlsx;
