//! E2E test infrastructure
//!
//! - One sandbox bootstrap per test binary, on a dedicated runtime
//! - Fresh HTTP fixture per test

pub mod shared_sandbox;

pub use shared_sandbox::{e2e_enabled, SharedSandbox};
