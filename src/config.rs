//! Client construction parameters.
//!
//! [`Configuration`] collects everything a [`crate::routing::RoutingClient`]
//! or tunnel client needs at construction time: the known group-address
//! table, the source address stamped on outgoing frames, network endpoints,
//! and the optional frame-observer callback. Built with the same
//! constructor-plus-range-checked-setters idiom used throughout
//! `addressing` and `protocol::cemi` (`ControlField1::new`, `Hpai::new`).

use std::collections::HashMap;
use std::sync::Arc;

use crate::addressing::{GroupAddress, IndividualAddress};
use crate::error::{KnxError, Result};
use crate::net::Ipv4Addr;

/// Default KNXnet/IP routing multicast group.
pub const DEFAULT_MULTICAST_IP: Ipv4Addr = Ipv4Addr::new(224, 0, 23, 12);
/// Default KNXnet/IP port (routing and tunnelling alike).
pub const DEFAULT_PORT: u16 = 3671;

/// Observer invoked after every routing-indication is handled.
///
/// Takes the raw cEMI bytes and whether the client recognised and acted on
/// them. Failures inside the callback are logged and swallowed by the
/// caller, never propagated (spec: "failures are logged and swallowed").
pub type FrameCallback = Arc<dyn Fn(&[u8], bool) + Send + Sync>;

/// Construction parameters for a routing or tunnel client.
#[derive(Clone)]
pub struct Configuration {
    allow_unknown_gpa: bool,
    group_addresses: HashMap<GroupAddress, String>,
    local_ip: Option<Ipv4Addr>,
    multicast_ip: Ipv4Addr,
    source_address: IndividualAddress,
    frame_callback: Option<FrameCallback>,
}

impl Configuration {
    /// Start building a configuration. `source_address` is stamped on every
    /// outgoing cEMI data frame.
    pub fn new(source_address: IndividualAddress) -> Self {
        Self {
            allow_unknown_gpa: false,
            group_addresses: HashMap::new(),
            local_ip: None,
            multicast_ip: DEFAULT_MULTICAST_IP,
            source_address,
            frame_callback: None,
        }
    }

    /// If true, reads and writes on unknown group addresses are allowed:
    /// received values surface as raw bits, sent values must be pre-encoded.
    /// Default `false`.
    #[must_use]
    pub fn allow_unknown_gpa(mut self, allow: bool) -> Self {
        self.allow_unknown_gpa = allow;
        self
    }

    /// Register a known group address and the DPT string it carries (e.g.
    /// `"9.001"`).
    #[must_use]
    pub fn group_address(mut self, address: GroupAddress, dpt: impl Into<String>) -> Self {
        self.group_addresses.insert(address, dpt.into());
        self
    }

    /// Register a whole initial known-GA set at once.
    #[must_use]
    pub fn group_addresses(mut self, addresses: HashMap<GroupAddress, String>) -> Self {
        self.group_addresses.extend(addresses);
        self
    }

    /// Override the local bind address. Defaults to letting the OS pick.
    #[must_use]
    pub fn local_ip(mut self, ip: Ipv4Addr) -> Self {
        self.local_ip = Some(ip);
        self
    }

    /// Override the multicast group. Defaults to `224.0.23.12`.
    #[must_use]
    pub fn multicast_ip(mut self, ip: Ipv4Addr) -> Self {
        self.multicast_ip = ip;
        self
    }

    /// Install a frame observer, invoked after every routing-indication is
    /// handled with `(cemi_bytes, handled)`.
    #[must_use]
    pub fn frame_callback(mut self, callback: FrameCallback) -> Self {
        self.frame_callback = Some(callback);
        self
    }

    /// Whether unknown group addresses are allowed through.
    pub const fn allow_unknown_gpa_enabled(&self) -> bool {
        self.allow_unknown_gpa
    }

    /// The configured known-GA table.
    pub fn known_group_addresses(&self) -> &HashMap<GroupAddress, String> {
        &self.group_addresses
    }

    /// Look up the DPT string configured for `address`.
    ///
    /// # Errors
    ///
    /// Returns [`KnxError::Cache`] if `address` is unknown and
    /// `allow_unknown_gpa` is not set.
    pub fn dpt_for(&self, address: GroupAddress) -> Result<Option<&str>> {
        match self.group_addresses.get(&address) {
            Some(dpt) => Ok(Some(dpt.as_str())),
            None if self.allow_unknown_gpa => Ok(None),
            None => Err(KnxError::unknown_group_address()),
        }
    }

    /// The configured local bind address, if any.
    pub const fn local_address(&self) -> Option<Ipv4Addr> {
        self.local_ip
    }

    /// The configured multicast group.
    pub const fn multicast_address(&self) -> Ipv4Addr {
        self.multicast_ip
    }

    /// The source address stamped on outgoing cEMI data frames.
    pub const fn source_address(&self) -> IndividualAddress {
        self.source_address
    }

    /// The installed frame observer, if any.
    pub fn callback(&self) -> Option<&FrameCallback> {
        self.frame_callback.as_ref()
    }
}
