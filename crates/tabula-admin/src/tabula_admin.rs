//! Tabula Admin - users and sessions administration layer
//!
//! Sits between an authentication provider and the admin console UI:
//!
//! - `provider` - the [`AuthProvider`] seam and its entities
//! - `memory` - in-process provider for tests and demos
//! - `roles` - role string normalization
//! - `directory` - user/session row projections, overview stats, and
//!   prebuilt grid columns for the admin pages
//! - `actions` - guarded admin operations (create, ban, remove, ...)
//! - `routes` - route table, matcher, and access guard

pub mod actions;
pub mod directory;
pub mod memory;
pub mod provider;
pub mod roles;
pub mod routes;

pub use actions::*;
pub use directory::*;
pub use memory::*;
pub use provider::*;
pub use roles::*;
pub use routes::*;
