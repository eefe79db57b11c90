//! Tracing setup shared by the controller binary and the test suites.

pub mod tracing;
