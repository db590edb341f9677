//! DPT 4.xxx - Character
//!
//! - **4.001** - ASCII (7-bit), encode rejects code points above 127.
//! - **4.002** - Latin-1 (8-bit).

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 4.* value.
///
/// `sub` distinguishes 4.001 (ASCII) from 4.002 (Latin-1); anything else
/// falls back to the stricter ASCII behavior.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::Char`], or the code
/// point does not fit the selected subtype.
pub fn encode_raw(value: &DptValue, sub: &str) -> Result<Vec<u8>> {
    let DptValue::Char(c) = value else {
        return Err(KnxError::invalid_dpt_data());
    };
    let code_point = u32::from(*c);
    match sub {
        "002" => {
            let byte = u8::try_from(code_point).map_err(|_| KnxError::dpt_value_out_of_range())?;
            Ok(vec![byte])
        }
        _ => {
            if code_point > 127 {
                return Err(KnxError::dpt_value_out_of_range());
            }
            Ok(vec![code_point as u8])
        }
    }
}

/// Decode a DPT 4.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is empty.
pub fn decode_raw(data: &[u8], _sub: &str) -> Result<DptValue> {
    if data.is_empty() {
        return Err(KnxError::invalid_dpt_data());
    }
    // Latin-1 code points map 1:1 onto the first 256 Unicode scalars, so
    // this also covers the ASCII (4.001) case.
    Ok(DptValue::Char(char::from(data[0])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_ascii() {
        assert_eq!(encode_raw(&DptValue::Char('A'), "001").unwrap(), vec![0x41]);
    }

    #[test]
    fn rejects_non_ascii_on_4_001() {
        assert!(encode_raw(&DptValue::Char('é'), "001").is_err());
    }

    #[test]
    fn encodes_latin1() {
        assert_eq!(encode_raw(&DptValue::Char('é'), "002").unwrap(), vec![0xE9]);
    }

    #[test]
    fn dispatcher_round_trips() {
        let bytes = encode_raw(&DptValue::Char('Z'), "001").unwrap();
        assert_eq!(decode_raw(&bytes, "001").unwrap(), DptValue::Char('Z'));
    }
}
