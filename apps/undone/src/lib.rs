//! # undone
//!
//! Library half of the undone.jp backend binary. Exposed so integration
//! tests can build the router against mocked upstreams.

pub mod api;
pub mod cli;
pub mod config;
pub mod render;
pub mod upstream;
