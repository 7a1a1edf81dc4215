//! Request extractors and middleware.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`allowed_hosts::enforce_allowed_hosts`] -- Rejects requests for unknown `Host` values.

pub mod allowed_hosts;
pub mod auth;
