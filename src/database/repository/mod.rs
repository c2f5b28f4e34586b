//! Repository module - data access layer.

mod chat_repository;

pub use chat_repository::ChatRepository;
