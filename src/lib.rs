pub mod checkpoint;
pub mod config;
pub mod crawler;
pub mod export;
pub mod models;

pub use models::Result;
