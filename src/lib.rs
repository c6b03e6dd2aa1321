//! Burrow - Gopher client and server
//!
//! Core library for the Gopher protocol (RFC 1436): the item codec, a
//! client, and a server framework with routing and file serving.

pub mod client;
pub mod config;
pub mod error;
pub mod fs;
pub mod gopher;
pub mod server;

pub use error::{Error, Result};
