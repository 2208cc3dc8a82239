//! Test modules for the queue link
//!
//! Tests are organized by functional area for better maintainability.

mod dedup;
mod gating;
mod support;
