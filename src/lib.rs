// src/lib.rs

pub mod config;
pub mod db;
pub mod draft;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod save;
pub mod state;
pub mod validation;

// Re-export specific items for convenience if needed
pub use routes::create_router;
