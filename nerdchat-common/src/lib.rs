//! # nerdchat Common Library
//!
//! Shared code for the nerdchat crates:
//! - Error and result types
//! - Bootstrap configuration (TOML, environment, root folder resolution)
//! - Timestamp and freshness helpers

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
