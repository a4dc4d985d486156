//! Admin directory: user and session row projections
//!
//! Joins the provider's users and sessions into the flat rows the admin
//! grids consume, plus the overview stats card data.

mod service;

#[cfg(test)]
mod tests;

pub use service::*;
