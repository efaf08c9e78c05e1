// src/models/mod.rs
pub mod admission;
pub mod messages;
pub mod sync;

pub use admission::*;
pub use messages::*;
pub use sync::*;
