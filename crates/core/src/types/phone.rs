//! Customer phone number type.
//!
//! The phone number is the customer's identity everywhere downstream of the
//! auth provider. Each collaborator wants a different rendering of it, so
//! the number is stored once (national digits) and formatted on demand.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains something other than digits after the prefix.
    #[error("phone number must contain only digits")]
    NonDigit,
    /// The national part is not exactly ten digits.
    #[error("phone number must have {expected} digits (got {actual})")]
    WrongLength {
        /// Required number of national digits.
        expected: usize,
        /// Number of digits supplied.
        actual: usize,
    },
    /// Indian mobile numbers start with 6, 7, 8 or 9.
    #[error("phone number must start with 6, 7, 8 or 9")]
    InvalidLeadingDigit,
}

/// An Indian mobile number.
///
/// ## Accepted forms
///
/// - `9876543210` (national)
/// - `+919876543210` (E.164)
/// - `919876543210` (country code without `+`)
///
/// Spaces and dashes are ignored.
///
/// ## Renderings
///
/// ```
/// use eggbucket_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse("+91 98765-43210").unwrap();
/// assert_eq!(phone.e164(), "+919876543210");
/// assert_eq!(phone.document_key(), "9876543210");
/// assert_eq!(phone.customer_id(), "919876543210");
///
/// assert!(PhoneNumber::parse("12345").is_err());
/// assert!(PhoneNumber::parse("5876543210").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Country calling code for India.
    pub const COUNTRY_CODE: &'static str = "91";

    /// Number of national digits.
    pub const NATIONAL_LENGTH: usize = 10;

    /// Parse a `PhoneNumber` from user or provider input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Contains characters other than digits, spaces, dashes, or a leading `+`
    /// - Does not have exactly ten national digits
    /// - Does not start with 6-9
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let compact: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();

        if compact.is_empty() {
            return Err(PhoneError::Empty);
        }

        let digits = compact.strip_prefix('+').unwrap_or(&compact);
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }

        let national = if digits.len() == Self::NATIONAL_LENGTH + Self::COUNTRY_CODE.len() {
            digits.strip_prefix(Self::COUNTRY_CODE).unwrap_or(digits)
        } else {
            digits
        };

        if national.len() != Self::NATIONAL_LENGTH {
            return Err(PhoneError::WrongLength {
                expected: Self::NATIONAL_LENGTH,
                actual: national.len(),
            });
        }

        if !national.starts_with(['6', '7', '8', '9']) {
            return Err(PhoneError::InvalidLeadingDigit);
        }

        Ok(Self(national.to_owned()))
    }

    /// The ten national digits.
    #[must_use]
    pub fn national(&self) -> &str {
        &self.0
    }

    /// E.164 form sent to the auth provider (`+91XXXXXXXXXX`).
    #[must_use]
    pub fn e164(&self) -> String {
        format!("+{}{}", Self::COUNTRY_CODE, self.0)
    }

    /// Key of the customer document (national digits).
    #[must_use]
    pub fn document_key(&self) -> &str {
        &self.0
    }

    /// Customer id used on orders (`91XXXXXXXXXX`).
    #[must_use]
    pub fn customer_id(&self) -> String {
        format!("{}{}", Self::COUNTRY_CODE, self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.e164())
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PhoneNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.e164())
    }
}

impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
