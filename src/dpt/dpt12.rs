//! DPT 12.xxx - 32-bit unsigned

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 12.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::U32`].
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    match value {
        DptValue::U32(v) => Ok(v.to_be_bytes().to_vec()),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

/// Decode a DPT 12.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is shorter than 4 bytes.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.len() < 4 {
        return Err(KnxError::invalid_dpt_data());
    }
    Ok(DptValue::U32(u32::from_be_bytes([data[0], data[1], data[2], data[3]])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_round_trips() {
        let bytes = encode_raw(&DptValue::U32(4_000_000_000)).unwrap();
        assert_eq!(decode_raw(&bytes).unwrap(), DptValue::U32(4_000_000_000));
    }
}
