//! Integration test common infrastructure.
//!
//! Provides a mock line-oriented IRC server and throwaway TLS assets
//! for exercising the client against real sockets.

#![allow(dead_code)]

pub mod server;
pub mod tls;

#[allow(unused_imports)]
pub use server::{ServerConn, TestServer};
