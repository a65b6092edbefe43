//! Loading sales notes and the client directory from JSON exports.

pub mod loader;

pub use loader::*;
