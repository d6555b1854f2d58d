//! HTTP API: configuration, request gate, routing, and error mapping.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
