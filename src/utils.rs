use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{EdfError, Result};

/// Parses a space-padded ASCII integer field.
///
/// Surrounding whitespace is ignored. Empty text, non-numeric text and
/// values that overflow `T` are all reported as [`EdfError::MalformedField`].
pub fn parse_int_field<T: FromStr>(field: &'static str, text: &str) -> Result<T> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EdfError::malformed(field, text));
    }
    trimmed
        .parse::<T>()
        .map_err(|_| EdfError::malformed(field, text))
}

/// Parses a space-padded ASCII decimal field such as `"0.5     "`.
///
/// `NaN` and the infinities are rejected along with non-numeric text.
pub fn parse_float_field(field: &'static str, text: &str) -> Result<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EdfError::malformed(field, text));
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(EdfError::malformed(field, text)),
    }
}

fn split_triplet(field: &'static str, text: &str) -> Result<(u32, u32, u32)> {
    let parts: Vec<&str> = text.trim().split('.').collect();
    if parts.len() != 3 {
        return Err(EdfError::malformed(field, text));
    }
    Ok((
        parse_int_field(field, parts[0])?,
        parse_int_field(field, parts[1])?,
        parse_int_field(field, parts[2])?,
    ))
}

/// Parses the `dd.mm.yy` start date.
///
/// Two-digit years use the EDF clipping rule: 85-99 are 1985-1999,
/// 00-84 are 2000-2084.
pub fn parse_edf_date(text: &str) -> Result<NaiveDate> {
    let (day, month, yy) = split_triplet("start_date", text)?;
    let year = if yy >= 85 { 1900 + yy } else { 2000 + yy };
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| EdfError::malformed("start_date", text))
}

/// Parses the `hh.mm.ss` start time.
pub fn parse_edf_time(text: &str) -> Result<NaiveTime> {
    let (hour, minute, second) = split_triplet("start_time", text)?;
    NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| EdfError::malformed("start_time", text))
}

pub fn parse_edf_datetime(date: &str, time: &str) -> Result<NaiveDateTime> {
    Ok(NaiveDateTime::new(parse_edf_date(date)?, parse_edf_time(time)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_int_field() {
        assert_eq!(parse_int_field::<i64>("n", "123     ").unwrap(), 123);
        assert_eq!(parse_int_field::<i64>("n", "-1      ").unwrap(), -1);
        assert_eq!(parse_int_field::<i64>("n", "  +42 ").unwrap(), 42);
        assert!(parse_int_field::<i64>("n", "12.5    ").is_err());
        assert!(parse_int_field::<i64>("n", "abc     ").is_err());
        assert!(parse_int_field::<i64>("n", "        ").is_err());
    }

    #[test]
    fn test_parse_int_field_overflow() {
        match parse_int_field::<i32>("digital_max", "99999999999") {
            Err(EdfError::MalformedField { field, .. }) => assert_eq!(field, "digital_max"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_float_field() {
        assert_eq!(parse_float_field("d", "1       ").unwrap(), 1.0);
        assert_eq!(parse_float_field("d", "0.5     ").unwrap(), 0.5);
        assert_eq!(parse_float_field("d", "-200    ").unwrap(), -200.0);
        assert!(parse_float_field("d", "1,5     ").is_err());
    }

    #[test]
    fn test_parse_float_field_rejects_non_finite() {
        for text in ["NaN     ", "inf     ", "-inf    ", "infinity"] {
            match parse_float_field("data_record_duration", text) {
                Err(EdfError::MalformedField { field, value }) => {
                    assert_eq!(field, "data_record_duration");
                    assert_eq!(value, text);
                }
                other => panic!("unexpected result for {:?}: {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_parse_edf_datetime() {
        let dt = parse_edf_datetime("24.04.89", "16.13.00").unwrap();
        assert_eq!(dt.year(), 1989);
        assert_eq!(dt.month(), 4);
        assert_eq!(dt.day(), 24);
        assert_eq!(dt.hour(), 16);
        assert_eq!(dt.minute(), 13);

        let dt = parse_edf_datetime("01.01.24", "00.00.01").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.second(), 1);
    }

    #[test]
    fn test_parse_edf_datetime_invalid() {
        assert!(parse_edf_date("32.01.99").is_err());
        assert!(parse_edf_date("01-01-99").is_err());
        assert!(parse_edf_time("25.00.00").is_err());
    }
}
