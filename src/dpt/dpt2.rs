//! DPT 2.xxx - 1-bit controlled
//!
//! Like DPT 1 but paired with a control bit: bit 1 is the control/priority
//! flag, bit 0 is the value.

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 2.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::TwoBit`].
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    match value {
        DptValue::TwoBit(control, v) => {
            let byte = (u8::from(*control) << 1) | u8::from(*v);
            Ok(vec![byte])
        }
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

/// Decode a DPT 2.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is empty.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.is_empty() {
        return Err(KnxError::invalid_dpt_data());
    }
    let byte = data[0];
    Ok(DptValue::TwoBit(byte & 0x02 != 0, byte & 0x01 != 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_control_and_value() {
        assert_eq!(encode_raw(&DptValue::TwoBit(true, false)).unwrap(), vec![0x02]);
        assert_eq!(encode_raw(&DptValue::TwoBit(false, true)).unwrap(), vec![0x01]);
    }

    #[test]
    fn dispatcher_round_trips() {
        let bytes = encode_raw(&DptValue::TwoBit(true, true)).unwrap();
        assert_eq!(decode_raw(&bytes).unwrap(), DptValue::TwoBit(true, true));
    }

    #[test]
    fn rejects_empty_data() {
        assert!(decode_raw(&[]).is_err());
    }
}
