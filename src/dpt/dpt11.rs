//! DPT 11.001 - Date
//!
//! 3 bytes: `rsv:3 | day:5`, `rsv:4 | month:4`, `rsv:1 | year:7`. The
//! 2-digit wire year maps `90..=99` to `1990..=1999` and `00..=89` to
//! `2000..=2089`.

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 11.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::Date`], or a field
/// is out of range (including years outside `1990..=2089`).
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    let DptValue::Date { day, month, year } = value else {
        return Err(KnxError::invalid_dpt_data());
    };
    if !(1..=31).contains(day) || !(1..=12).contains(month) {
        return Err(KnxError::dpt_value_out_of_range());
    }
    let wire_year = match *year {
        1990..=1999 => (year - 1990) as u8,
        2000..=2089 => (year - 2000 + 90) as u8,
        _ => return Err(KnxError::dpt_value_out_of_range()),
    };
    Ok(vec![*day, *month, wire_year])
}

/// Decode a DPT 11.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is shorter than 3 bytes.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.len() < 3 {
        return Err(KnxError::invalid_dpt_data());
    }
    let wire_year = data[2] & 0x7F;
    let year = if wire_year >= 90 {
        1900 + u16::from(wire_year)
    } else {
        2000 + u16::from(wire_year)
    };
    Ok(DptValue::Date { day: data[0] & 0x1F, month: data[1] & 0x0F, year })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_wire_year_1990s() {
        let bytes = encode_raw(&DptValue::Date { day: 1, month: 1, year: 1999 }).unwrap();
        assert_eq!(bytes[2], 99);
    }

    #[test]
    fn maps_wire_year_2000s() {
        let bytes = encode_raw(&DptValue::Date { day: 1, month: 1, year: 2024 }).unwrap();
        assert_eq!(bytes[2], 24);
    }

    #[test]
    fn dispatcher_round_trips() {
        let value = DptValue::Date { day: 28, month: 7, year: 2026 };
        let bytes = encode_raw(&value).unwrap();
        assert_eq!(decode_raw(&bytes).unwrap(), value);
    }

    #[test]
    fn rejects_year_out_of_range() {
        let value = DptValue::Date { day: 1, month: 1, year: 1989 };
        assert!(encode_raw(&value).is_err());
    }
}
