//! KNX Datapoint Types (DPT)
//!
//! This module provides encoding and decoding for KNX Datapoint Types.
//! DPTs define how to interpret the data payload in KNX telegrams.
//!
//! ## Supported DPT Families
//!
//! - **DPT 1.xxx** - Boolean (1 bit): switches, buttons, binary sensors
//! - **DPT 2.xxx** - 1-bit controlled
//! - **DPT 3.xxx** - 3-bit controlled: dimming, blind control
//! - **DPT 4.xxx** - character
//! - **DPT 5.xxx** - 8-bit unsigned: percentages, angles, counters
//! - **DPT 6.xxx** - 8-bit signed, and the `Status_Mode3` bitfield (6.020)
//! - **DPT 7.xxx** - 16-bit unsigned: pulses, brightness, color temperature
//! - **DPT 8.xxx** - 16-bit signed
//! - **DPT 9.xxx** - 2-byte float: temperature, illuminance, pressure
//! - **DPT 10.xxx** - time of day
//! - **DPT 11.xxx** - date
//! - **DPT 12.xxx** - 32-bit unsigned
//! - **DPT 13.xxx** - 32-bit signed: energy, flow rate, long counters
//! - **DPT 14.xxx** - 32-bit IEEE-754 float
//! - **DPT 15.xxx** - access data
//! - **DPT 16.xxx** - 14-byte character string
//! - **DPT 17.xxx** - scene number
//! - **DPT 18.xxx** - scene control
//! - **DPT 19.xxx** - date and time
//! - **DPT 20.xxx** - 8-bit enum
//! - **DPT 21.xxx** - 8-bit boolean bitfield
//! - **DPT 22.xxx** - 16-bit boolean bitfield
//! - **DPT 23.xxx** - 2-bit enum
//! - **DPT 24.xxx** - NUL-terminated ASCII string
//! - **DPT 25.xxx** - 8-bit unsigned
//! - **DPT 26.xxx** - active scene number
//! - **DPT 27.xxx** - combined 16-channel status
//! - **DPT 28.xxx** - NUL-terminated UTF-8 string
//! - **DPT 29.xxx** - 64-bit signed
//! - **DPT 219.xxx** - system status
//!
//! ## Usage
//!
//! ```rust,no_run
//! use knxnet::dpt::{self, DptValue};
//!
//! // The DPT string is data - it comes from a group-address table at
//! // runtime, not from a call site that knows the type at compile time.
//! let bytes = dpt::encode(&DptValue::Bool(true), "1.001")?;
//! let value = dpt::decode(&bytes, "1.001")?;
//! assert_eq!(value, DptValue::Bool(true));
//! # Ok::<(), knxnet::KnxError>(())
//! ```
//!
//! Family-specific enums (`Dpt1`, `Dpt3`, `Dpt5`, `Dpt7`, `Dpt9`, `Dpt13`)
//! are kept for call sites that *do* know their DPT at compile time; they
//! are thin wrappers around the same `encode_raw`/`decode_raw` functions the
//! string dispatcher uses.

use crate::error::Result;

pub mod dpt1;
pub mod dpt2;
pub mod dpt3;
pub mod dpt4;
pub mod dpt5;
pub mod dpt6;
pub mod dpt7;
pub mod dpt8;
pub mod dpt9;
pub mod dpt10;
pub mod dpt11;
pub mod dpt12;
pub mod dpt13;
pub mod dpt14;
pub mod dpt15;
pub mod dpt16;
pub mod dpt17;
pub mod dpt18;
pub mod dpt19;
pub mod dpt20;
pub mod dpt21;
pub mod dpt22;
pub mod dpt23;
pub mod dpt24;
pub mod dpt25;
pub mod dpt26;
pub mod dpt27;
pub mod dpt28;
pub mod dpt29;
pub mod dpt219;

#[doc(inline)]
pub use dpt1::Dpt1;
#[doc(inline)]
pub use dpt3::{ControlCommand, Dpt3, StepCode};
#[doc(inline)]
pub use dpt5::Dpt5;
#[doc(inline)]
pub use dpt7::Dpt7;
#[doc(inline)]
pub use dpt9::Dpt9;
#[doc(inline)]
pub use dpt13::Dpt13;
#[doc(inline)]
pub use dpt19::DateTime19;

/// Trait for encoding values to KNX data format.
///
/// Accepts an output buffer and returns the number of bytes written, so
/// implementations never require a static allocation sized for every
/// possible value.
pub trait DptEncode<T> {
    /// Encode `value` into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`crate::KnxError`] if `buf` is too small or `value` is out
    /// of the family's representable range.
    fn encode(&self, value: T, buf: &mut [u8]) -> Result<usize>;
}

/// Trait for decoding KNX data to values.
pub trait DptDecode<T> {
    /// Decode `data` to a value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::KnxError`] if `data` does not hold a valid encoding.
    fn decode(&self, data: &[u8]) -> Result<T>;
}

/// The decoded shape of every supported DPT family.
///
/// One variant is shared across families whose decoded value has the same
/// shape (e.g. `U8` backs 5.*, 17.001, 20.*, and 25.001); each family module
/// still enforces its own range restrictions in `encode_raw`.
#[derive(Debug, Clone, PartialEq)]
pub enum DptValue {
    /// 1.*
    Bool(bool),
    /// 2.*, 23.*: (control, value)
    TwoBit(bool, bool),
    /// 3.*: (control, stepcode 0..=7)
    ThreeBitControlled(bool, u8),
    /// 4.001, 4.002
    Char(char),
    /// 5.*, 17.001, 20.*, 25.001
    U8(u8),
    /// 6.020 `Status_Mode3`
    StatusMode3 {
        /// Bit 7.
        a: bool,
        /// Bit 6.
        b: bool,
        /// Bit 5.
        c: bool,
        /// Bit 4.
        d: bool,
        /// Bit 3.
        e: bool,
        /// Mode, encoded one-hot across bits 2..0 as `{0,2,4}`.
        f: u8,
    },
    /// 6.*
    I8(i8),
    /// 7.*
    U16(u16),
    /// 8.*
    I16(i16),
    /// 9.*
    Float16(f32),
    /// 10.001
    TimeOfDay {
        /// Day of week, 0 = no day, 1..=7 = Monday..Sunday.
        day: u8,
        /// Hour, 0..=23.
        hour: u8,
        /// Minute, 0..=59.
        minute: u8,
        /// Second, 0..=59.
        second: u8,
    },
    /// 11.001
    Date {
        /// Day of month, 1..=31.
        day: u8,
        /// Month, 1..=12.
        month: u8,
        /// Full year, e.g. 2024.
        year: u16,
    },
    /// 12.*
    U32(u32),
    /// 13.*
    I32(i32),
    /// 14.*
    F32(f32),
    /// 15.*: access data
    AccessData {
        /// Six BCD digits, most significant first.
        digits: [u8; 6],
        /// Detection error flag.
        detection_error: bool,
        /// Permission (access granted) flag.
        permission: bool,
        /// Read direction flag.
        read_direction: bool,
        /// Encryption flag.
        encryption: bool,
        /// Index, 0..=15.
        index: u8,
    },
    /// 16.000, 16.001: 14-byte character string
    Text14(String),
    /// 18.001, 26.001: (control/active, scene 0..=63)
    BoolAndScene(bool, u8),
    /// 19.001
    DateTime19(DateTime19),
    /// 21.*: 8 independent booleans, MSB-first
    Bool8([bool; 8]),
    /// 22.*: 16 independent booleans
    Bool16([bool; 16]),
    /// 24.001, 28.001: NUL-terminated string
    NulString(String),
    /// 27.001: per-bit (state, valid) pairs, 16 channels
    CombinedStatus16 {
        /// Per-channel state bits.
        state: u16,
        /// Per-channel validity bits.
        valid: u16,
    },
    /// 29.*
    I64(i64),
    /// 219.001: system status
    SystemStatus219 {
        /// Log number.
        log_number: u8,
        /// Priority.
        priority: u8,
        /// Application area.
        application_area: u8,
        /// Error class.
        error_class: u8,
        /// Attribute bits, 0..=15.
        attributes: u8,
        /// Status bits, 0..=7.
        status: u8,
    },
}

/// Normalize a DPT identifier into its `(main, sub)` components.
///
/// `sub` is left as the original string (not reparsed to an int) so wildcard
/// matching (`"main.*"`) and exact matching (`"main.sub"`) both work off the
/// same normalised form; `main` is parsed as an integer since every family
/// dispatches on it.
fn split_dpt(dpt: &str) -> Result<(u32, &str)> {
    let mut parts = dpt.splitn(2, '.');
    let main = parts
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(crate::error::KnxError::unsupported_dpt)?;
    let sub = parts.next().unwrap_or("*");
    Ok((main, sub))
}

/// Encode `value` for the given DPT string (e.g. `"9.001"`).
///
/// # Errors
///
/// Returns [`crate::KnxError`] if `dpt` names an unsupported family, or if
/// `value`'s shape or range does not match that family.
pub fn encode(value: &DptValue, dpt: &str) -> Result<Vec<u8>> {
    let (main, sub) = split_dpt(dpt)?;
    match main {
        1 => dpt1::encode_raw(value),
        2 => dpt2::encode_raw(value),
        3 => dpt3::encode_raw(value),
        4 => dpt4::encode_raw(value, sub),
        5 => dpt5::encode_raw(value),
        6 => dpt6::encode_raw(value, sub),
        7 => dpt7::encode_raw(value),
        8 => dpt8::encode_raw(value),
        9 => dpt9::encode_raw(value),
        10 => dpt10::encode_raw(value),
        11 => dpt11::encode_raw(value),
        12 => dpt12::encode_raw(value),
        13 => dpt13::encode_raw(value),
        14 => dpt14::encode_raw(value),
        15 => dpt15::encode_raw(value),
        16 => dpt16::encode_raw(value, sub),
        17 => dpt17::encode_raw(value),
        18 => dpt18::encode_raw(value),
        19 => dpt19::encode_raw(value),
        20 => dpt20::encode_raw(value),
        21 => dpt21::encode_raw(value),
        22 => dpt22::encode_raw(value),
        23 => dpt23::encode_raw(value),
        24 => dpt24::encode_raw(value),
        25 => dpt25::encode_raw(value),
        26 => dpt26::encode_raw(value),
        27 => dpt27::encode_raw(value),
        28 => dpt28::encode_raw(value),
        29 => dpt29::encode_raw(value),
        219 => dpt219::encode_raw(value),
        _ => Err(crate::error::KnxError::unsupported_dpt()),
    }
}

/// Decode `bytes` for the given DPT string (e.g. `"9.001"`).
///
/// # Errors
///
/// Returns [`crate::KnxError`] if `dpt` names an unsupported family, or if
/// `bytes` does not hold a valid encoding for that family.
pub fn decode(bytes: &[u8], dpt: &str) -> Result<DptValue> {
    let (main, sub) = split_dpt(dpt)?;
    match main {
        1 => dpt1::decode_raw(bytes),
        2 => dpt2::decode_raw(bytes),
        3 => dpt3::decode_raw(bytes),
        4 => dpt4::decode_raw(bytes, sub),
        5 => dpt5::decode_raw(bytes),
        6 => dpt6::decode_raw(bytes, sub),
        7 => dpt7::decode_raw(bytes),
        8 => dpt8::decode_raw(bytes),
        9 => dpt9::decode_raw(bytes),
        10 => dpt10::decode_raw(bytes),
        11 => dpt11::decode_raw(bytes),
        12 => dpt12::decode_raw(bytes),
        13 => dpt13::decode_raw(bytes),
        14 => dpt14::decode_raw(bytes),
        15 => dpt15::decode_raw(bytes),
        16 => dpt16::decode_raw(bytes, sub),
        17 => dpt17::decode_raw(bytes),
        18 => dpt18::decode_raw(bytes),
        19 => dpt19::decode_raw(bytes),
        20 => dpt20::decode_raw(bytes),
        21 => dpt21::decode_raw(bytes),
        22 => dpt22::decode_raw(bytes),
        23 => dpt23::decode_raw(bytes),
        24 => dpt24::decode_raw(bytes),
        25 => dpt25::decode_raw(bytes),
        26 => dpt26::decode_raw(bytes),
        27 => dpt27::decode_raw(bytes),
        28 => dpt28::decode_raw(bytes),
        29 => dpt29::decode_raw(bytes),
        219 => dpt219::decode_raw(bytes),
        _ => Err(crate::error::KnxError::unsupported_dpt()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_exact_dpt() {
        assert_eq!(split_dpt("9.001").unwrap(), (9, "001"));
    }

    #[test]
    fn splits_wildcard_dpt() {
        assert_eq!(split_dpt("5.*").unwrap(), (5, "*"));
        assert_eq!(split_dpt("5").unwrap(), (5, "*"));
    }

    #[test]
    fn rejects_non_numeric_main() {
        assert!(split_dpt("abc.001").is_err());
    }

    #[test]
    fn dispatches_bool_round_trip() {
        let bytes = encode(&DptValue::Bool(true), "1.001").unwrap();
        assert_eq!(decode(&bytes, "1.001").unwrap(), DptValue::Bool(true));
    }

    #[test]
    fn dispatches_unsupported_family() {
        assert!(encode(&DptValue::Bool(true), "999.001").is_err());
    }
}
