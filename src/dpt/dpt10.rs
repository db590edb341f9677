//! DPT 10.001 - Time of day
//!
//! 3 bytes: `day:3 | hour:5`, `rsv:2 | minute:6`, `rsv:2 | second:6`. Day
//! 0 means "no day", 1..=7 is Monday..Sunday.

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 10.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::TimeOfDay`], or a
/// field is out of range.
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    let DptValue::TimeOfDay { day, hour, minute, second } = value else {
        return Err(KnxError::invalid_dpt_data());
    };
    if *day > 7 || *hour > 23 || *minute > 59 || *second > 59 {
        return Err(KnxError::dpt_value_out_of_range());
    }
    Ok(vec![(day << 5) | hour, *minute, *second])
}

/// Decode a DPT 10.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is shorter than 3 bytes.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.len() < 3 {
        return Err(KnxError::invalid_dpt_data());
    }
    Ok(DptValue::TimeOfDay {
        day: data[0] >> 5,
        hour: data[0] & 0x1F,
        minute: data[1] & 0x3F,
        second: data[2] & 0x3F,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_round_trips() {
        let value = DptValue::TimeOfDay { day: 3, hour: 14, minute: 30, second: 0 };
        let bytes = encode_raw(&value).unwrap();
        assert_eq!(decode_raw(&bytes).unwrap(), value);
    }

    #[test]
    fn rejects_invalid_hour() {
        let value = DptValue::TimeOfDay { day: 0, hour: 24, minute: 0, second: 0 };
        assert!(encode_raw(&value).is_err());
    }

    #[test]
    fn ignores_reserved_bits_on_decode() {
        let value = decode_raw(&[0x0E, 0xC0 | 30, 0x00]).unwrap();
        assert_eq!(value, DptValue::TimeOfDay { day: 0, hour: 14, minute: 30, second: 0 });
    }
}
