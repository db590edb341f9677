//! DPT 24.001 - Variable-length NUL-terminated ASCII string

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 24.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::NulString`] or
/// contains a non-ASCII character.
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    let DptValue::NulString(s) = value else {
        return Err(KnxError::invalid_dpt_data());
    };
    let mut bytes = Vec::with_capacity(s.len() + 1);
    for c in s.chars() {
        let code_point = u32::from(c);
        if code_point > 127 {
            return Err(KnxError::dpt_value_out_of_range());
        }
        bytes.push(code_point as u8);
    }
    bytes.push(0);
    Ok(bytes)
}

/// Decode a DPT 24.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` contains no NUL terminator.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    let end = data
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(KnxError::invalid_dpt_data)?;
    let s: String = data[..end].iter().map(|b| char::from(*b)).collect();
    Ok(DptValue::NulString(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_round_trips() {
        let value = DptValue::NulString("hello world".to_string());
        let bytes = encode_raw(&value).unwrap();
        assert_eq!(bytes.last(), Some(&0));
        assert_eq!(decode_raw(&bytes).unwrap(), value);
    }

    #[test]
    fn rejects_non_ascii() {
        assert!(encode_raw(&DptValue::NulString("café".to_string())).is_err());
    }

    #[test]
    fn rejects_missing_terminator() {
        assert!(decode_raw(b"no terminator").is_err());
    }
}
