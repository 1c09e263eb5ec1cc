pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod month;
pub mod pipeline;
pub mod regression;
pub mod render;
pub mod selection;
