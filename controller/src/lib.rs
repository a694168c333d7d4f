mod backoff;
mod config;
mod context;
pub mod controllers;
mod error;
mod reconciler;
mod service;
mod store;
mod trace;
mod utils;

pub use backoff::{BackoffError, RetryPolicy};
pub use config::Config;
pub use context::Context;
pub use error::{ControllerError, ControllerResult};
pub use store::GuestBookStore;
pub use utils::ControllerStreamExt;
