//! Todo Gate - Request Admission for a Todo Service
//!
//! This crate decides whether a mutating action is admitted before it is
//! handed to the external account/storage service. Every action passes a
//! sliding-window rate limiter, then a schema validator that normalizes the
//! raw fields, then a denylist sanitizer for free text.

pub mod admission;
pub mod config;
pub mod error;
pub mod ratelimit;
pub mod sanitize;
pub mod validation;
