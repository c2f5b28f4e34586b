//! Bot module - Telegram transport, dispatching and runtime.

mod dispatcher;
mod gateway;
mod runtime;
mod webhook;

pub use dispatcher::{AppState, build_dispatcher};
pub use gateway::TelegramGateway;
pub use runtime::run;
