//! DPT 219.001 - System status
//!
//! 6 bytes: `log_number`, `priority`, `application_area`, `error_class`
//! one per byte, then `rsv:4 | attributes:4` and `rsv:5 | status:3`.

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// Encode a DPT 219.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::SystemStatus219`],
/// or `attributes`/`status` are out of range.
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    let DptValue::SystemStatus219 {
        log_number,
        priority,
        application_area,
        error_class,
        attributes,
        status,
    } = value
    else {
        return Err(KnxError::invalid_dpt_data());
    };
    if *attributes > 15 || *status > 7 {
        return Err(KnxError::dpt_value_out_of_range());
    }
    Ok(vec![*log_number, *priority, *application_area, *error_class, *attributes, *status])
}

/// Decode a DPT 219.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is shorter than 6 bytes.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.len() < 6 {
        return Err(KnxError::invalid_dpt_data());
    }
    Ok(DptValue::SystemStatus219 {
        log_number: data[0],
        priority: data[1],
        application_area: data[2],
        error_class: data[3],
        attributes: data[4] & 0x0F,
        status: data[5] & 0x07,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_round_trips() {
        let value = DptValue::SystemStatus219 {
            log_number: 1,
            priority: 2,
            application_area: 3,
            error_class: 4,
            attributes: 9,
            status: 5,
        };
        let bytes = encode_raw(&value).unwrap();
        assert_eq!(bytes.len(), 6);
        assert_eq!(decode_raw(&bytes).unwrap(), value);
    }

    #[test]
    fn rejects_attributes_above_15() {
        let value = DptValue::SystemStatus219 {
            log_number: 0,
            priority: 0,
            application_area: 0,
            error_class: 0,
            attributes: 16,
            status: 0,
        };
        assert!(encode_raw(&value).is_err());
    }
}
