//! Tabula Core - shared value model and error types
//!
//! This crate provides the fundamental types that the other Tabula crates
//! depend on:
//!
//! - `Value` - loosely typed cell value with tolerant coercions
//! - `Error` / `Result` - common error type for provider and service calls

mod error;
mod types;

pub use error::*;
pub use types::*;
