//! DPT 19.001 - Date and time
//!
//! 8 bytes: `year8, rsv:4|month:4, rsv:3|day:5, weekday:3|hour:5,
//! rsv:2|minute:6, rsv:2|second:6, flags_hi:8, flags_lo:8`.
//!
//! `flags_hi` holds, MSB-first: fault, working-day, no-working-day,
//! no-year, no-date, no-day-of-week, no-time, SUTI (standard time info).
//! `flags_lo`'s only defined bit is CLQ (clock quality) in the MSB.
//!
//! If any of no-year, no-date, no-time is set on the wire, the decoded
//! value collapses to the canonical [`DateTime19::invalid_date_and_time`]
//! sentinel, per the format's "unknown timestamp" convention.

use crate::dpt::DptValue;
use crate::error::{KnxError, Result};

/// A decoded DPT 19.001 date/time, or the "no value" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime19 {
    /// Full year, e.g. 2024. Meaningless when `no_year` is set.
    pub year: u16,
    /// Month, 1..=12.
    pub month: u8,
    /// Day of month, 1..=31.
    pub day: u8,
    /// Day of week, 0 = no day, 1..=7 = Monday..Sunday.
    pub weekday: u8,
    /// Hour, 0..=23.
    pub hour: u8,
    /// Minute, 0..=59.
    pub minute: u8,
    /// Second, 0..=59.
    pub second: u8,
    /// Device fault flag.
    pub fault: bool,
    /// Working day flag.
    pub working_day: bool,
    /// No-working-day-information flag.
    pub no_working_day: bool,
    /// Year field carries no information.
    pub no_year: bool,
    /// Month/day fields carry no information.
    pub no_date: bool,
    /// Weekday field carries no information.
    pub no_day_of_week: bool,
    /// Hour/minute/second fields carry no information.
    pub no_time: bool,
    /// Standard time info flag (daylight saving indication).
    pub suti: bool,
    /// Clock quality flag.
    pub clq: bool,
}

impl DateTime19 {
    /// The canonical "no value" date/time: all fields zeroed, with
    /// `no_year`, `no_date`, and `no_time` set.
    pub const fn invalid_date_and_time() -> Self {
        Self {
            year: 0,
            month: 0,
            day: 0,
            weekday: 0,
            hour: 0,
            minute: 0,
            second: 0,
            fault: false,
            working_day: false,
            no_working_day: false,
            no_year: true,
            no_date: true,
            no_day_of_week: false,
            no_time: true,
            suti: false,
            clq: false,
        }
    }

    /// Whether this value is the "no value" sentinel.
    pub const fn is_invalid(&self) -> bool {
        self.no_year || self.no_date || self.no_time
    }
}

/// Encode a DPT 19.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `value` is not [`DptValue::DateTime19`], or a
/// field is out of range for a non-sentinel value.
pub fn encode_raw(value: &DptValue) -> Result<Vec<u8>> {
    let DptValue::DateTime19(dt) = value else {
        return Err(KnxError::invalid_dpt_data());
    };

    if dt.is_invalid() {
        return Ok(vec![0, 0, 0, 0, 0, 0, 0x18, 0]);
    }

    if !(1900..=2155).contains(&dt.year)
        || !(1..=12).contains(&dt.month)
        || !(1..=31).contains(&dt.day)
        || dt.weekday > 7
        || dt.hour > 23
        || dt.minute > 59
        || dt.second > 59
    {
        return Err(KnxError::dpt_value_out_of_range());
    }

    let flags_hi = (u8::from(dt.fault) << 7)
        | (u8::from(dt.working_day) << 6)
        | (u8::from(dt.no_working_day) << 5)
        | (u8::from(dt.no_year) << 4)
        | (u8::from(dt.no_date) << 3)
        | (u8::from(dt.no_day_of_week) << 2)
        | (u8::from(dt.no_time) << 1)
        | u8::from(dt.suti);
    let flags_lo = u8::from(dt.clq) << 7;

    Ok(vec![
        (dt.year - 1900) as u8,
        dt.month,
        dt.day,
        (dt.weekday << 5) | dt.hour,
        dt.minute,
        dt.second,
        flags_hi,
        flags_lo,
    ])
}

/// Decode a DPT 19.001 value.
///
/// # Errors
///
/// Returns [`KnxError`] if `data` is shorter than 8 bytes.
pub fn decode_raw(data: &[u8]) -> Result<DptValue> {
    if data.len() < 8 {
        return Err(KnxError::invalid_dpt_data());
    }

    let flags_hi = data[6];
    let no_year = flags_hi & 0x10 != 0;
    let no_date = flags_hi & 0x08 != 0;
    let no_time = flags_hi & 0x02 != 0;

    if no_year || no_date || no_time {
        return Ok(DptValue::DateTime19(DateTime19::invalid_date_and_time()));
    }

    let flags_lo = data[7];
    Ok(DptValue::DateTime19(DateTime19 {
        year: 1900 + u16::from(data[0]),
        month: data[1] & 0x0F,
        day: data[2] & 0x1F,
        weekday: data[3] >> 5,
        hour: data[3] & 0x1F,
        minute: data[4] & 0x3F,
        second: data[5] & 0x3F,
        fault: flags_hi & 0x80 != 0,
        working_day: flags_hi & 0x40 != 0,
        no_working_day: flags_hi & 0x20 != 0,
        no_year: false,
        no_date: false,
        no_day_of_week: flags_hi & 0x04 != 0,
        no_time: false,
        suti: flags_hi & 0x01 != 0,
        clq: flags_lo & 0x80 != 0,
    }))
}
