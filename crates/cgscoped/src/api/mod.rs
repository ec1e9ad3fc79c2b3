//! HTTP API.

pub mod server;
