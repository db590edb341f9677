//! DPT 14.xxx - 32-bit IEEE-754 float

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 14.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::F32`].
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    match value {
        DptValue::F32(v) => Ok(v.to_be_bytes().to_vec()),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

/// Decode a DPT 14.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is shorter than 4 bytes.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.len() < 4 {
        return Err(KnxError::invalid_dpt_data());
    }
    Ok(DptValue::F32(f32::from_be_bytes([data[0], data[1], data[2], data[3]])))
}
