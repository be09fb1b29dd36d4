//! # music-lib Common Library
//!
//! Shared code for the music-lib catalog service:
//! - Error type and result alias
//! - Configuration resolution (CLI/env > TOML > defaults)
//! - Tracing initialization
//! - Postgres pool bootstrap and schema creation

pub mod config;
pub mod db;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
