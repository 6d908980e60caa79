//! Test Helper Utilities
//!
//! Shared utilities for testing the exoMAST client without network access

pub mod scripted_gateway;

pub use scripted_gateway::{test_options, ScriptedGateway, API_BASE};
