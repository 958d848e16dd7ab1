mod auth;
pub mod client;
pub mod endpoint;
pub mod paginate;
#[cfg(test)]
pub mod testing;
pub mod types;

pub use auth::{Credential, resolve_api_key};
pub use client::{ApiClient, ApiError, HttpTransport};
