//! HTTP API for the shop backend: server, routing, and request/response
//! mapping over the document store.

pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
