//! DPT 16.xxx - 14-byte character string
//!
//! - **16.000** - ASCII, encode rejects non-ASCII characters.
//! - **16.001** - Latin-1.
//!
//! Both are fixed-length 14-byte fields, NUL-padded; trailing NULs are
//! trimmed on decode.

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

const LEN: usize = 14;

/// Encode a DPT 16.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::Text14`], the
/// string is longer than 14 characters, or (on 16.000) contains a
/// non-ASCII character.
pub fn encode_raw(value: &DptValue, sub: &str) -> Result<Vec<u8>> {
    let DptValue::Text14(s) = value else {
        return Err(KnxError::invalid_dpt_data());
    };
    let mut buf = [0u8; LEN];
    let mut i = 0;
    for c in s.chars() {
        if i >= LEN {
            return Err(KnxError::dpt_value_out_of_range());
        }
        let code_point = u32::from(c);
        let byte = if sub == "001" {
            u8::try_from(code_point).map_err(|_| KnxError::dpt_value_out_of_range())?
        } else {
            if code_point > 127 {
                return Err(KnxError::dpt_value_out_of_range());
            }
            code_point as u8
        };
        buf[i] = byte;
        i += 1;
    }
    Ok(buf.to_vec())
}

/// Decode a DPT 16.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is shorter than 14 bytes.
pub fn decode_raw(data: &[u8], _sub: &str) -> Result<DptValue> {
    if data.len() < LEN {
        return Err(KnxError::invalid_dpt_data());
    }
    let trimmed = data[..LEN]
        .iter()
        .rposition(|b| *b != 0)
        .map_or(0, |pos| pos + 1);
    let s: String = data[..trimmed].iter().map(|b| char::from(*b)).collect();
    Ok(DptValue::Text14(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_round_trips() {
        let value = DptValue::Text14("hello".to_string());
        let bytes = encode_raw(&value, "000").unwrap();
        assert_eq!(bytes.len(), 14);
        assert_eq!(decode_raw(&bytes, "000").unwrap(), value);
    }

    #[test]
    fn rejects_non_ascii_on_16_000() {
        let value = DptValue::Text14("café".to_string());
        assert!(encode_raw(&value, "000").is_err());
    }

    #[test]
    fn accepts_latin1_on_16_001() {
        let value = DptValue::Text14("café".to_string());
        assert!(encode_raw(&value, "001").is_ok());
    }

    #[test]
    fn rejects_strings_longer_than_14() {
        let value = DptValue::Text14("x".repeat(15));
        assert!(encode_raw(&value, "000").is_err());
    }
}
