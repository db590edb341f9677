//! DPT 23.xxx - 2-bit enum
//!
//! Same wire layout as [`crate::dpt::dpt2`] (bit 1, bit 0) but a distinct
//! family: the two bits are independent enum members (a, b) rather than a
//! control/value pair.

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 23.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::TwoBit`].
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    match value {
        DptValue::TwoBit(a, b) => Ok(vec![(u8::from(*a) << 1) | u8::from(*b)]),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

/// Decode a DPT 23.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is empty.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.is_empty() {
        return Err(KnxError::invalid_dpt_data());
    }
    let byte = data[0];
    Ok(DptValue::TwoBit(byte & 0x02 != 0, byte & 0x01 != 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_round_trips() {
        let bytes = encode_raw(&DptValue::TwoBit(false, true)).unwrap();
        assert_eq!(decode_raw(&bytes).unwrap(), DptValue::TwoBit(false, true));
    }
}
