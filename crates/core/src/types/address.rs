//! Delivery addresses from the customer's address book.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors for addresses.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AddressError {
    /// A required address field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// A coordinate is outside its valid range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
}

/// The postal part of an address. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullAddress {
    #[serde(default)]
    pub flat_no: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
}

impl FullAddress {
    /// Trim every field and check that none is blank.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingField`] naming the first blank field.
    pub fn validated(self) -> Result<Self, AddressError> {
        let trimmed = Self {
            flat_no: self.flat_no.trim().to_owned(),
            area: self.area.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            zip_code: self.zip_code.trim().to_owned(),
            country: self.country.trim().to_owned(),
        };

        for (name, value) in [
            ("flatNo", &trimmed.flat_no),
            ("area", &trimmed.area),
            ("city", &trimmed.city),
            ("state", &trimmed.state),
            ("zipCode", &trimmed.zip_code),
            ("country", &trimmed.country),
        ] {
            if value.is_empty() {
                return Err(AddressError::MissingField(name));
            }
        }

        Ok(trimmed)
    }
}

impl fmt::Display for FullAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}-{}",
            self.flat_no, self.area, self.city, self.state, self.country, self.zip_code
        )
    }
}

/// Latitude/longitude pair. Either may be absent on stored addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub long: Option<f64>,
}

impl Coordinates {
    /// Both coordinates set.
    #[must_use]
    pub const fn new(lat: f64, long: f64) -> Self {
        Self {
            lat: Some(lat),
            long: Some(long),
        }
    }

    /// Check that any present coordinate is within range.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::OutOfRange`] for a latitude outside ±90 or a
    /// longitude outside ±180 (including NaN).
    pub fn validate(&self) -> Result<(), AddressError> {
        if let Some(lat) = self.lat
            && !(-90.0..=90.0).contains(&lat)
        {
            return Err(AddressError::OutOfRange {
                field: "lat",
                min: -90.0,
                max: 90.0,
            });
        }
        if let Some(long) = self.long
            && !(-180.0..=180.0).contains(&long)
        {
            return Err(AddressError::OutOfRange {
                field: "long",
                min: -180.0,
                max: 180.0,
            });
        }
        Ok(())
    }
}

/// One entry of the address book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub full_address: FullAddress,
    #[serde(default)]
    pub coordinates: Coordinates,
}

impl Address {
    /// Validate both parts and return the normalized address.
    ///
    /// # Errors
    ///
    /// Returns the first [`AddressError`] found.
    pub fn validated(self) -> Result<Self, AddressError> {
        self.coordinates.validate()?;
        Ok(Self {
            full_address: self.full_address.validated()?,
            coordinates: self.coordinates,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.full_address.fmt(f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> FullAddress {
        FullAddress {
            flat_no: " 12B ".to_owned(),
            area: "Koramangala".to_owned(),
            city: "Bengaluru".to_owned(),
            state: "Karnataka".to_owned(),
            zip_code: "560034".to_owned(),
            country: "India".to_owned(),
        }
    }

    #[test]
    fn test_validated_trims_fields() {
        let address = sample().validated().unwrap();
        assert_eq!(address.flat_no, "12B");
    }

    #[test]
    fn test_each_blank_field_is_rejected() {
        let blanks: [(&str, fn(&mut FullAddress)); 6] = [
            ("flatNo", |a| a.flat_no.clear()),
            ("area", |a| a.area = "  ".to_owned()),
            ("city", |a| a.city.clear()),
            ("state", |a| a.state.clear()),
            ("zipCode", |a| a.zip_code.clear()),
            ("country", |a| a.country.clear()),
        ];

        for (field, blank) in blanks {
            let mut address = sample();
            blank(&mut address);
            assert_eq!(
                address.validated(),
                Err(AddressError::MissingField(field)),
                "field: {field}"
            );
        }
    }

    #[test]
    fn test_display() {
        let address = sample().validated().unwrap();
        assert_eq!(
            address.to_string(),
            "12B, Koramangala, Bengaluru, Karnataka, India-560034"
        );
    }

    #[test]
    fn test_coordinates_range() {
        assert!(Coordinates::new(12.93, 77.62).validate().is_ok());
        assert!(Coordinates::default().validate().is_ok());
        assert!(Coordinates::new(91.0, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, -181.0).validate().is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_wire_format_uses_camel_case_and_null_coordinates() {
        let json = r#"{
            "fullAddress": {"flatNo": "1", "area": "A", "city": "C", "state": "S", "zipCode": "5", "country": "IN"},
            "coordinates": {"lat": null, "long": null}
        }"#;
        let address: Address = serde_json::from_str(json).unwrap();
        assert_eq!(address.full_address.zip_code, "5");
        assert_eq!(address.coordinates, Coordinates::default());

        let value = serde_json::to_value(&address).unwrap();
        assert_eq!(value["fullAddress"]["flatNo"], "1");
    }
}
