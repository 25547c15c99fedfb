//! Personal identification number (PIN) decoding.
//!
//! A PIN is 14 characters long. The first character encodes gender and
//! characters 2-9 hold the birth date as `DDMMYYYY`.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Gender;

/// Required PIN length in characters.
pub const PIN_LENGTH: usize = 14;

/// Reasons a PIN cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinError {
    /// The PIN does not have exactly [`PIN_LENGTH`] characters.
    Length(usize),
    /// Characters 2-9 are not a valid `DDMMYYYY` date.
    BirthDate(String),
    /// The first character is neither `1` nor `2`.
    GenderDigit(char),
}

impl std::fmt::Display for PinError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinError::Length(len) => write!(
                f,
                "PIN must be exactly {} characters long, got {}",
                PIN_LENGTH, len
            ),
            PinError::BirthDate(raw) => {
                write!(f, "Invalid PIN format for birth date extraction: {:?}", raw)
            }
            PinError::GenderDigit(c) => {
                write!(f, "Invalid first digit in PIN for gender determination: {:?}", c)
            }
        }
    }
}

impl std::error::Error for PinError {}

/// Fields decoded from a PIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinInfo {
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

/// Check the PIN length without decoding anything.
pub fn validate_length(pin: &str) -> Result<(), PinError> {
    let len = pin.chars().count();
    if len != PIN_LENGTH {
        return Err(PinError::Length(len));
    }
    Ok(())
}

/// Decode the birth date from characters 2-9.
pub fn birth_date(pin: &str) -> Result<NaiveDate, PinError> {
    validate_length(pin)?;

    let raw: String = pin.chars().skip(1).take(8).collect();
    if !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(PinError::BirthDate(raw));
    }

    // All eight characters are ASCII digits, so byte slicing is safe.
    let day: u32 = raw[0..2].parse().map_err(|_| PinError::BirthDate(raw.clone()))?;
    let month: u32 = raw[2..4].parse().map_err(|_| PinError::BirthDate(raw.clone()))?;
    let year: i32 = raw[4..8].parse().map_err(|_| PinError::BirthDate(raw.clone()))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or(PinError::BirthDate(raw))
}

/// Decode the gender from the first character.
pub fn gender(pin: &str) -> Result<Gender, PinError> {
    validate_length(pin)?;

    match pin.chars().next() {
        Some('1') => Ok(Gender::Female),
        Some('2') => Ok(Gender::Male),
        Some(other) => Err(PinError::GenderDigit(other)),
        None => Err(PinError::Length(0)),
    }
}

/// Decode both birth date and gender.
pub fn parse(pin: &str) -> Result<PinInfo, PinError> {
    Ok(PinInfo {
        birth_date: birth_date(pin)?,
        gender: gender(pin)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_female_pin() {
        let info = parse("10101199912345").unwrap();
        assert_eq!(info.birth_date, NaiveDate::from_ymd_opt(1999, 1, 1).unwrap());
        assert_eq!(info.gender, Gender::Female);
    }

    #[test]
    fn test_parse_male_pin() {
        let info = parse("22902200000017").unwrap();
        assert_eq!(info.birth_date, NaiveDate::from_ymd_opt(2000, 2, 29).unwrap());
        assert_eq!(info.gender, Gender::Male);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let pins = ["10101199912345", "23112198500001", "13112198500001"];
        for pin in pins {
            assert_eq!(parse(pin), parse(pin));
        }
    }

    #[test]
    fn test_invalid_gender_digit() {
        for pin in ["30101199912345", "00101199912345", "90101199912345", "A0101199912345"] {
            let first = pin.chars().next().unwrap();
            assert_eq!(parse(pin), Err(PinError::GenderDigit(first)));
        }
    }

    #[test]
    fn test_wrong_length_fails_before_date_parsing() {
        // Characters 2-9 are not a date, but the length check comes first.
        assert_eq!(parse("1XXXXXXXX"), Err(PinError::Length(9)));
        assert_eq!(birth_date("1XXXXXXXX"), Err(PinError::Length(9)));
        assert_eq!(parse(""), Err(PinError::Length(0)));
        assert_eq!(parse("101011999123456"), Err(PinError::Length(15)));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 14 characters, more than 14 bytes.
        let err = parse("1ДДММГГГГ12345").unwrap_err();
        assert!(matches!(err, PinError::BirthDate(_)));
    }

    #[test]
    fn test_invalid_calendar_date() {
        assert!(matches!(parse("13102199912345"), Err(PinError::BirthDate(_))));
        assert!(matches!(parse("12902199912345"), Err(PinError::BirthDate(_))));
        assert!(matches!(parse("10113199912345"), Err(PinError::BirthDate(_))));
        assert!(matches!(parse("1+101199912345"), Err(PinError::BirthDate(_))));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PinError::Length(3).to_string(),
            "PIN must be exactly 14 characters long, got 3"
        );
        assert!(PinError::GenderDigit('3').to_string().contains("gender"));
    }
}
