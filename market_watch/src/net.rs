//! Networking layer for talking to the dashboard backend.
//!
//! Every outbound request goes through a single [`gateway::HttpGateway`],
//! which attaches the bearer token, normalizes failures into
//! [`errors::ApiError`] and turns an unexpected 401 into a forced logout.

/// Normalized error shape and error taxonomy.
pub mod errors;

/// Authenticated JSON-over-HTTP gateway.
pub mod gateway;

/// Navigation seam used by forced logouts.
pub mod navigator;
