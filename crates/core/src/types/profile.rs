//! Customer profile document and profile edits.

use serde::{Deserialize, Deserializer, Serialize};

use super::address::Address;
use super::status::Gender;

/// Validation errors for profile edits.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("name is required")]
    MissingName,
    #[error("email is required")]
    MissingEmail,
    #[error("email address is invalid")]
    InvalidEmail,
    #[error("age must be between {min} and {max}")]
    InvalidAge { min: u8, max: u8 },
}

/// The customer document as returned by the backend.
///
/// Every field is optional on the wire; a customer who has only signed in
/// has nothing but a phone number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    #[serde(default, alias = "phone")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_age")]
    pub age: Option<u8>,
    #[serde(default, deserialize_with = "lenient_gender")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl CustomerProfile {
    /// Profile used when the customer document does not exist yet.
    #[must_use]
    pub fn with_phone(phone: impl Into<String>) -> Self {
        Self {
            phone_number: Some(phone.into()),
            ..Self::default()
        }
    }

    /// Name for greetings and order payloads, if one has been set.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// Edit submitted from the profile form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub age: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl ProfileUpdate {
    pub const MIN_AGE: u8 = 1;
    pub const MAX_AGE: u8 = 120;

    /// Trim and validate the edit.
    ///
    /// # Errors
    ///
    /// Returns a [`ProfileError`] for a blank name or email, an email
    /// without a local part and a dotted domain, or an age outside 1..=120.
    pub fn validated(self) -> Result<Self, ProfileError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(ProfileError::MissingName);
        }

        let email = self.email.trim().to_owned();
        if email.is_empty() {
            return Err(ProfileError::MissingEmail);
        }
        if !is_plausible_email(&email) {
            return Err(ProfileError::InvalidEmail);
        }

        if !(Self::MIN_AGE..=Self::MAX_AGE).contains(&self.age) {
            return Err(ProfileError::InvalidAge {
                min: Self::MIN_AGE,
                max: Self::MAX_AGE,
            });
        }

        Ok(Self {
            name,
            email,
            age: self.age,
            gender: self.gender,
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// Profile forms have stored age both as a number and as a string.
fn lenient_age<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAge {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<RawAge>::deserialize(deserializer)? {
        Some(RawAge::Number(n)) => u8::try_from(n).ok(),
        Some(RawAge::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn lenient_gender<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Gender>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|s| Gender::parse(&s)))
}
