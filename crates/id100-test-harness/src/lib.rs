//! Test harness for the ID100 protocol driver.
//!
//! Provides [`MockLink`], a scripted [`Link`](id100_protocol::Link) that lets
//! device operations be tested without hardware.

mod mock_link;

pub use mock_link::*;
