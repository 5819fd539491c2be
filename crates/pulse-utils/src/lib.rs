//! Shared utilities for NewsPulse
//!
//! This crate provides common functionality used across the NewsPulse workspace,
//! including logging setup and environment lookups.

pub mod env;
pub mod logging;

pub use env::{env_flag, env_var, first_env_var};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
