//! Database module exports.

mod models;
mod mongo;
mod repository;

pub use mongo::Database;
pub use repository::ChatRepository;
