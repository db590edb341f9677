//! DPT 27.001 - Combined 16-channel status
//!
//! 4 bytes: high 16 bits are the per-channel validity mask, low 16 bits
//! are the per-channel state, both big-endian.

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 27.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::CombinedStatus16`].
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    match value {
        DptValue::CombinedStatus16 { state, valid } => {
            let mut bytes = Vec::with_capacity(4);
            bytes.extend_from_slice(&valid.to_be_bytes());
            bytes.extend_from_slice(&state.to_be_bytes());
            Ok(bytes)
        }
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

/// Decode a DPT 27.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is shorter than 4 bytes.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.len() < 4 {
        return Err(KnxError::invalid_dpt_data());
    }
    let valid = u16::from_be_bytes([data[0], data[1]]);
    let state = u16::from_be_bytes([data[2], data[3]]);
    Ok(DptValue::CombinedStatus16 { state, valid })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_round_trips() {
        let value = DptValue::CombinedStatus16 { state: 0x00FF, valid: 0xFF00 };
        let bytes = encode_raw(&value).unwrap();
        assert_eq!(bytes, vec![0xFF, 0x00, 0x00, 0xFF]);
        assert_eq!(decode_raw(&bytes).unwrap(), value);
    }
}
