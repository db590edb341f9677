//! DPT 25.001 - 8-bit unsigned

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 25.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::U8`].
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    match value {
        DptValue::U8(v) => Ok(vec![*v]),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

/// Decode a DPT 25.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is empty.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.is_empty() {
        return Err(KnxError::invalid_dpt_data());
    }
    Ok(DptValue::U8(data[0]))
}
