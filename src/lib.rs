//! lmstudio-rs: vendor adapter for local inference servers
//!
//! This library translates generic chat, completion and embedding requests
//! into the REST dialect spoken by LM Studio (and compatible local servers)
//! and validates the JSON that comes back.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::too_many_lines)]

pub mod cli;
pub mod config;
pub mod error;
pub mod messages;
pub mod services;

// Re-exports for convenience
pub use error::{ErrorKind, Operation, Result, VendorError};
pub use messages::{ChatOptions, Message, Role};
pub use services::{lmstudio::LmStudioClient, RequestContext, Vendor};
