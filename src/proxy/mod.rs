//! Proxy module for streaming channel requests
//!
//! Implements the request pipeline: path resolution against the channel's
//! origin URL, the upstream fetch, manifest-vs-segment classification, and
//! either a manifest rewrite or an incremental body relay.

pub mod error_response;
pub mod headers;
pub mod manifest;
pub mod path_resolver;
pub mod service;
pub mod types;


pub use service::ProxyService;
pub use types::{ProxyConfig, ProxyError, ProxyResult};
