//! Interactive menu front-end for the todo list.
pub mod config;
pub mod session;
pub mod ui;

pub use session::Session;
