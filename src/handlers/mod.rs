// src/handlers/mod.rs

pub mod draft;
pub mod exam;
pub mod session;
pub mod status;
