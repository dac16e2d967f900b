//! Shared plumbing for the demo binaries in this crate; no public API beyond
//! [`common`] is intended for consumption outside `lob-bins` itself.

pub mod common;
