// Tollgate — Library root
//
// Re-exports the store, configuration, and CLI modules.

pub mod cli;
pub mod config;
pub mod error;
pub mod store;

pub use error::{Result, TollgateError};
