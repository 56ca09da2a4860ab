// src/models/mod.rs

pub mod exam;
pub mod localized;
pub mod question;
