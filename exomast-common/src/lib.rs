//! # exoMAST Common Library
//!
//! Shared code for the exoMAST client crates:
//! - Error type and result alias
//! - Service settings resolution (CLI → ENV → TOML → compiled defaults)
//! - TOML configuration read/write

pub mod config;
pub mod error;

pub use error::{Error, Result};
