//! Permission checks for admin-only commands.
//!
//! Lookups go through the messaging gateway and are cached for a few
//! minutes, so a burst of commands costs a single API call.

mod checker;

pub use checker::Permissions;
