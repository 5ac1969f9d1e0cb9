//! HTTP middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Session resolver: bearer token or cookie → `AuthContext`
//! 2. Rate limiter: per signed-in profile, else per peer address
//! 3. Audit logger: sees the profile and the final status
//! 4. Auth / role guards: per route group

pub mod audit;
pub mod auth;
pub mod rate;
pub mod role;
