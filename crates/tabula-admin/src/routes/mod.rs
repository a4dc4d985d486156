//! Route guarding
//!
//! Classifies request paths as public, authenticated, or admin-only,
//! and decides whether to allow them or redirect, carrying a sanitized
//! callback URL through the login bounce.

mod service;

#[cfg(test)]
mod tests;

pub use service::*;
