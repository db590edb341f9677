//! DPT 8.xxx - 16-bit signed

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 8.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::I16`].
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    match value {
        DptValue::I16(v) => Ok(v.to_be_bytes().to_vec()),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

/// Decode a DPT 8.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is shorter than 2 bytes.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.len() < 2 {
        return Err(KnxError::invalid_dpt_data());
    }
    Ok(DptValue::I16(i16::from_be_bytes([data[0], data[1]])))
}
