#![allow(dead_code)]

//! # knxnet
//!
//! A KNXnet/IP client library for home and building automation: routing
//! (multicast) and tunnelling (unicast, connection-oriented) clients over
//! the KNXnet/IP wire protocol, cEMI frame codec, and Datapoint Type (DPT)
//! encoding/decoding.
//!
//! ## Example
//!
//! ```rust,no_run
//! use knxnet::{config::Configuration, dpt::DptValue, routing, GroupAddress, IndividualAddress};
//!
//! # fn main() -> knxnet::Result<()> {
//! let source = IndividualAddress::new(1, 1, 1)?;
//! let ga = GroupAddress::new(1, 2, 3)?;
//! let config = Configuration::new(source).group_address(ga, "1.001");
//!
//! let handle = routing::start(config)?;
//! handle.write_group_address(ga, DptValue::Bool(true))?;
//! # Ok(())
//! # }
//! ```

pub mod addressing;
pub mod cache;
pub mod config;
pub mod dpt;
pub mod error;
pub mod net;
pub mod protocol;
pub mod routing;
pub mod telegram;
pub mod tunnel;

#[macro_use]
pub mod macros;

pub use addressing::{GroupAddress, IndividualAddress};
pub use cache::Cache;
pub use config::Configuration;
pub use dpt::{Dpt1, Dpt5, Dpt9, DptDecode, DptEncode};
pub use error::{KnxError, Result};
pub use telegram::{Telegram, TelegramKind};
