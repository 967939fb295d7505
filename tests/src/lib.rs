//! # CCV Provider Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-component flows
//!     ├── fixtures.rs   # Shared provider/transport setup
//!     ├── flows.rs      # Handshake -> unbonding -> acknowledgement scenarios
//!     └── properties.rs # Randomized ordering properties
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ccv-tests
//!
//! # Benchmarks
//! cargo bench -p ccv-tests
//! ```

pub mod integration;
