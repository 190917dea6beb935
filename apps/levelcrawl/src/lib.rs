//! # Levelcrawl - the application crate
//!
//! Wires the `levelcrawl-core` engine to a real neighbor service.
//!
//! - [`client`]: HTTP implementation of `NeighborSource`
//! - [`limiter`]: shared outbound rate limit
//! - [`config`]: layered settings
//! - [`cli`]: command definitions and handlers

pub mod cli;
pub mod client;
pub mod config;
pub mod limiter;

pub use client::{HttpNeighborSource, decode_neighbors};
pub use config::{Settings, SettingsOverrides};
