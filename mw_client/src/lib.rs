//! Internal modules for the dashboard client.
//!
//! This library provides logging setup and text rendering used by the
//! mw_client binary.

pub mod logging;
pub mod render;
