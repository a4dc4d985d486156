//! Guarded admin actions
//!
//! Every action validates its input and the acting principal, then
//! reports the outcome as an [`ActionResult`] value instead of an
//! error, so callers can surface the message directly.

mod service;


pub use service::*;
