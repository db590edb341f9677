//! Decoded group-service message.
//!
//! A [`Telegram`] is what a routing or tunnel client hands to subscribers:
//! the result of parsing a `ROUTING_INDICATION`/`TUNNELING_REQUEST` down
//! through the cEMI and DPT layers into an application value.

use crate::addressing::{GroupAddress, IndividualAddress};
use crate::dpt::DptValue;

/// The group service a [`Telegram`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelegramKind {
    /// `A_GroupValue_Read`. Carries no value.
    GroupRead,
    /// `A_GroupValue_Response`.
    GroupResponse,
    /// `A_GroupValue_Write`.
    GroupWrite,
}

/// A decoded group-service message.
///
/// `kind` and `destination` together form the routing key subscribers match
/// against. A `group_read` telegram has no value: it is treated as an empty
/// bitstring on the wire and carries `None` here.
#[derive(Debug, Clone, PartialEq)]
pub struct Telegram {
    /// Which group service this is.
    pub kind: TelegramKind,
    /// Sending device.
    pub source: IndividualAddress,
    /// Target group address.
    pub destination: GroupAddress,
    /// DPT-decoded application value. `None` for `group_read`, and for
    /// writes/responses to a group address whose DPT is unknown when
    /// `allow_unknown_gpa` lets the raw bits through undecoded (see
    /// [`crate::routing`]).
    pub value: Option<DptValue>,
}

impl Telegram {
    /// Construct a new telegram.
    pub const fn new(
        kind: TelegramKind,
        source: IndividualAddress,
        destination: GroupAddress,
        value: Option<DptValue>,
    ) -> Self {
        Self { kind, source, destination, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_read_carries_no_value() {
        let telegram = Telegram::new(
            TelegramKind::GroupRead,
            IndividualAddress::new(1, 1, 1).unwrap(),
            GroupAddress::new(1, 2, 3).unwrap(),
            None,
        );
        assert_eq!(telegram.value, None);
    }

    #[test]
    fn group_write_carries_a_value() {
        let telegram = Telegram::new(
            TelegramKind::GroupWrite,
            IndividualAddress::new(1, 1, 1).unwrap(),
            GroupAddress::new(1, 2, 3).unwrap(),
            Some(DptValue::Bool(true)),
        );
        assert_eq!(telegram.value, Some(DptValue::Bool(true)));
    }
}
