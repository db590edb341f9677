//! DPT 21.xxx - 8-bit boolean bitfield
//!
//! Eight independent status bits, MSB-first: `bits[0]` is bit 7 of the
//! wire byte, `bits[7]` is bit 0.

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 21.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::Bool8`].
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    match value {
        DptValue::Bool8(bits) => {
            let mut byte = 0u8;
            for (i, bit) in bits.iter().enumerate() {
                if *bit {
                    byte |= 1 << (7 - i);
                }
            }
            Ok(vec![byte])
        }
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

/// Decode a DPT 21.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is empty.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.is_empty() {
        return Err(KnxError::invalid_dpt_data());
    }
    let byte = data[0];
    let mut bits = [false; 8];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = byte & (1 << (7 - i)) != 0;
    }
    Ok(DptValue::Bool8(bits))
}
