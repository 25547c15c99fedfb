//! Data models for the staff records backend.
//!
//! JSON field names are camelCase to match the web client.

mod arrangement;
mod organization;
mod profile;
mod revision;

pub use arrangement::*;
pub use organization::*;
pub use profile::*;
pub use revision::*;
