//! Integration test crate for the Fathom price oracle.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise end-to-end epoch flows across multiple workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p fathom-integration-tests
//! ```
