//! ID100 Application Protocol
//!
//! This crate drives the application layer of the ID100 clock: a small
//! battery-backed RTC with an LED word matrix. Every operation is a single
//! command/reply exchange over a [`Link`], where each message starts with a
//! command byte followed by a fixed-size payload.
//!
//! # Protocol Overview
//!
//! - **Commands** (host → device): an ASCII command byte (`'t'` reads the
//!   time, `'T'` sets it) and a payload whose size is fixed by the command.
//! - **Replies** (device → host): the same command byte and a payload of the
//!   size the command defines.
//! - Multi-byte integers are big-endian on the wire.
//! - Flash commands echo the page number they acted on; a mismatch is
//!   reported as an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use id100_protocol::{Device, DriverConfig};
//!
//! let config = DriverConfig::from_file("id100.yaml")?;
//! let mut device = Device::new(my_link);
//! device.connect_with(&config)?;
//! println!("firmware {}", device.get_version()?);
//! device.set_rtc_calibration(-4.2)?;
//! device.disconnect()?;
//! ```

mod commands;
mod config;
mod constants;
mod device;
mod error;
mod link;
mod types;

pub use commands::*;
pub use config::*;
pub use constants::*;
pub use device::*;
pub use error::*;
pub use link::*;
pub use types::*;
