//! DPT 29.xxx - 64-bit signed

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 29.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::I64`].
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    match value {
        DptValue::I64(v) => Ok(v.to_be_bytes().to_vec()),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

/// Decode a DPT 29.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is shorter than 8 bytes.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.len() < 8 {
        return Err(KnxError::invalid_dpt_data());
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[..8]);
    Ok(DptValue::I64(i64::from_be_bytes(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_round_trips() {
        let bytes = encode_raw(&DptValue::I64(-1)).unwrap();
        assert_eq!(bytes, vec![0xFF; 8]);
        assert_eq!(decode_raw(&bytes).unwrap(), DptValue::I64(-1));
    }
}
