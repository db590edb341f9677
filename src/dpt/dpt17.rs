//! DPT 17.001 - Scene number

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 17.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::U8`] or the scene
/// number is outside `0..=63`.
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    match value {
        DptValue::U8(v) if *v <= 63 => Ok(vec![*v]),
        DptValue::U8(_) => Err(KnxError::dpt_value_out_of_range()),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

/// Decode a DPT 17.001 value. Only the low 6 bits are examined.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is empty.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.is_empty() {
        return Err(KnxError::invalid_dpt_data());
    }
    Ok(DptValue::U8(data[0] & 0x3F))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_scene_above_63() {
        assert!(encode_raw(&DptValue::U8(64)).is_err());
    }

    #[test]
    fn dispatcher_round_trips() {
        let bytes = encode_raw(&DptValue::U8(42)).unwrap();
        assert_eq!(decode_raw(&bytes).unwrap(), DptValue::U8(42));
    }
}
