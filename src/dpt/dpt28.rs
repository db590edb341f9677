//! DPT 28.001 - Variable-length NUL-terminated UTF-8 string

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 28.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::NulString`].
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    let DptValue::NulString(s) = value else {
        return Err(KnxError::invalid_dpt_data());
    };
    let mut bytes = s.as_bytes().to_vec();
    bytes.push(0);
    Ok(bytes)
}

/// Decode a DPT 28.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` contains no NUL terminator or the bytes
/// before it are not valid UTF-8.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    let end = data
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(KnxError::invalid_dpt_data)?;
    let s = core::str::from_utf8(&data[..end]).map_err(|_| KnxError::invalid_dpt_data())?;
    Ok(DptValue::NulString(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_round_trips() {
        let value = DptValue::NulString("héllo wörld".to_string());
        let bytes = encode_raw(&value).unwrap();
        assert_eq!(decode_raw(&bytes).unwrap(), value);
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(decode_raw(&[0xFF, 0xFE, 0x00]).is_err());
    }
}
