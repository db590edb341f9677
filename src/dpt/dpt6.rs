//! DPT 6.xxx - 8-bit signed, and the `Status_Mode3` bitfield (6.020)
//!
//! - **6.020** `Status_Mode3`: five independent status bits plus a
//!   one-hot 3-bit mode selector.
//! - **6.*** (all other subtypes): plain signed byte.

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 6.* value.
///
/// `sub` selects between `Status_Mode3` (6.020) and the generic `i8`
/// shape used by every other subtype.
///
/// # Errors
///
/// Returns [`KnxError`] if `value`'s shape does not match `sub`, or the
/// `Status_Mode3` mode field is not one-hot.
pub fn encode_raw(value: &DptValue, sub: &str) -> Result<Vec<u8>> {
    if sub == "020" {
        let DptValue::StatusMode3 { a, b, c, d, e, f } = value else {
            return Err(KnxError::invalid_dpt_data());
        };
        if !matches!(f, 0 | 1 | 2 | 4) {
            return Err(KnxError::dpt_value_out_of_range());
        }
        let byte = (u8::from(*a) << 7)
            | (u8::from(*b) << 6)
            | (u8::from(*c) << 5)
            | (u8::from(*d) << 4)
            | (u8::from(*e) << 3)
            | f;
        Ok(vec![byte])
    } else {
        let DptValue::I8(v) = value else {
            return Err(KnxError::invalid_dpt_data());
        };
        Ok(vec![*v as u8])
    }
}

/// Decode a DPT 6.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is empty.
pub fn decode_raw(data: &[u8], sub: &str) -> Result<DptValue> {
    if data.is_empty() {
        return Err(KnxError::invalid_dpt_data());
    }
    let byte = data[0];
    if sub == "020" {
        Ok(DptValue::StatusMode3 {
            a: byte & 0x80 != 0,
            b: byte & 0x40 != 0,
            c: byte & 0x20 != 0,
            d: byte & 0x10 != 0,
            e: byte & 0x08 != 0,
            f: byte & 0x07,
        })
    } else {
        Ok(DptValue::I8(byte as i8))
    }
}
