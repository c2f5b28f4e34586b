//! Cache module - typed caches on top of Moka.
//!
//! Only data that is safe to serve slightly stale goes through here: welcome
//! templates and admin lookups. The pending set is always read from the
//! database.

mod config;
mod typed;

pub use config::CacheConfig;
pub use typed::TypedCache;
