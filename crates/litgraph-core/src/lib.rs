//! litgraph core - shared types, error taxonomy, and settings

pub mod config;
pub mod error;
pub mod types;

pub use config::Settings;
pub use error::{Error, Result};
pub use types::*;
