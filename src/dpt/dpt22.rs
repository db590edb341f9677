//! DPT 22.xxx - 16-bit boolean bitfield
//!
//! Same convention as [`crate::dpt::dpt21`] extended across two bytes:
//! `bits[0]` is the MSB of the big-endian 16-bit word.

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 22.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::Bool16`].
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    match value {
        DptValue::Bool16(bits) => {
            let mut word = 0u16;
            for (i, bit) in bits.iter().enumerate() {
                if *bit {
                    word |= 1 << (15 - i);
                }
            }
            Ok(word.to_be_bytes().to_vec())
        }
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

/// Decode a DPT 22.* value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is shorter than 2 bytes.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.len() < 2 {
        return Err(KnxError::invalid_dpt_data());
    }
    let word = u16::from_be_bytes([data[0], data[1]]);
    let mut bits = [false; 16];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = word & (1 << (15 - i)) != 0;
    }
    Ok(DptValue::Bool16(bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_round_trips() {
        let mut bits = [false; 16];
        bits[0] = true;
        bits[15] = true;
        let bytes = encode_raw(&DptValue::Bool16(bits)).unwrap();
        assert_eq!(bytes, vec![0x80, 0x01]);
        assert_eq!(decode_raw(&bytes).unwrap(), DptValue::Bool16(bits));
    }
}
