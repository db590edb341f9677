//! DPT 26.001 - Active scene number
//!
//! Same wire layout as [`crate::dpt::dpt18`]: bit 7 = active, bits 5..0 =
//! scene number `0..=63`.

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 26.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::BoolAndScene`] or
/// the scene number is outside `0..=63`.
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    let DptValue::BoolAndScene(active, scene) = value else {
        return Err(KnxError::invalid_dpt_data());
    };
    if *scene > 63 {
        return Err(KnxError::dpt_value_out_of_range());
    }
    Ok(vec![(u8::from(*active) << 7) | scene])
}

/// Decode a DPT 26.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is empty.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.is_empty() {
        return Err(KnxError::invalid_dpt_data());
    }
    let byte = data[0];
    Ok(DptValue::BoolAndScene(byte & 0x80 != 0, byte & 0x3F))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_round_trips() {
        let value = DptValue::BoolAndScene(false, 5);
        let bytes = encode_raw(&value).unwrap();
        assert_eq!(decode_raw(&bytes).unwrap(), value);
    }
}
