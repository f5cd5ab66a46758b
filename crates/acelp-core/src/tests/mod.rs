//! Crate-level test suites
//!
//! Scenario tests drive the public search on hand-built subframes, property
//! tests check the invariants of every mode on arbitrary input, and the
//! regression tests pin the bit-stream format of the packers.

mod property;
pub mod utils;
