//! n8n API client and authentication.
//!
//! This module provides the [`N8nClient`] for interacting with the n8n public API,
//! along with the [`ApiKey`] authentication type.

mod auth;
mod n8n;

pub use auth::{API_KEY_HEADER, ApiKey};
pub use n8n::{ListQuery, N8nClient, PAGE_SIZE};
