//! Utility functions.
//!
//! Helpers shared by the command plugins and the verification core.

pub mod html;

pub use html::{command_args_html, fill_placeholders, html_escape};
