// src/utils/mod.rs
pub mod id_generator;
pub mod json_extract;
pub mod phone;
pub mod recipients;
