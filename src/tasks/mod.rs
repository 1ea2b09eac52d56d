//! Outbound integration with the external task API.

pub mod client;
