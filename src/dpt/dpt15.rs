//! DPT 15.xxx - Access data
//!
//! 4 bytes: six BCD digits packed two per byte (3 bytes), then one byte of
//! `detection_error:1 | permission:1 | read_direction:1 | encryption:1 |
//! index:4`.

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 15.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::AccessData`], or a
/// digit/index is out of range.
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    let DptValue::AccessData { digits, detection_error, permission, read_direction, encryption, index } = value else {
        return Err(KnxError::invalid_dpt_data());
    };
    if digits.iter().any(|d| *d > 9) || *index > 15 {
        return Err(KnxError::dpt_value_out_of_range());
    }
    let flags = (u8::from(*detection_error) << 7)
        | (u8::from(*permission) << 6)
        | (u8::from(*read_direction) << 5)
        | (u8::from(*encryption) << 4)
        | index;
    Ok(vec![
        (digits[0] << 4) | digits[1],
        (digits[2] << 4) | digits[3],
        (digits[4] << 4) | digits[5],
        flags,
    ])
}

/// Decode a DPT 15.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is shorter than 4 bytes.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.len() < 4 {
        return Err(KnxError::invalid_dpt_data());
    }
    let digits = [
        data[0] >> 4,
        data[0] & 0x0F,
        data[1] >> 4,
        data[1] & 0x0F,
        data[2] >> 4,
        data[2] & 0x0F,
    ];
    let flags = data[3];
    Ok(DptValue::AccessData {
        digits,
        detection_error: flags & 0x80 != 0,
        permission: flags & 0x40 != 0,
        read_direction: flags & 0x20 != 0,
        encryption: flags & 0x10 != 0,
        index: flags & 0x0F,
    })
}
