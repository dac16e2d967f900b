//! Testing utilities and mocks for integration tests (§6, §8).
//!
//! Provides mock implementations and test-data builders for:
//! - [`helpers::MockFeedAdapter`] / [`helpers::MockOrderGateway`]: programmable
//!   fakes for the inbound/outbound external seams.
//! - Market-data event and instrument fixtures.

pub mod helpers;

pub use helpers::*;
