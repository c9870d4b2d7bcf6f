//! HTTP client for the platform backend: wire types plus the connectivity
//! layer that stamps the current credential onto every outgoing request.

pub mod schemas;
pub mod connectivity;

pub use connectivity::ApiClient;
