//! Reverse geocoding for the address entry flow.
//!
//! Turns a latitude/longitude into an address draft using a Nominatim
//! compatible `/reverse` endpoint. The draft may be incomplete; the customer
//! fills in the rest before saving.

use eggbucket_core::{Address, AddressError, Coordinates, FullAddress};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::GeocoderConfig;

/// Nominatim requires an identifying user agent.
const USER_AGENT: &str = concat!("eggbucket-storefront/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur when reverse geocoding.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Coordinates out of range.
    #[error(transparent)]
    InvalidCoordinates(#[from] AddressError),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Nothing found at these coordinates.
    #[error("no address found for these coordinates")]
    NoResult,

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<ReverseAddress>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    house_number: Option<String>,
    building: Option<String>,
    road: Option<String>,
    neighbourhood: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

impl ReverseAddress {
    fn into_full_address(self) -> FullAddress {
        let area = [self.road, self.neighbourhood.or(self.suburb)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");

        FullAddress {
            flat_no: self.house_number.or(self.building).unwrap_or_default(),
            area,
            city: self
                .city
                .or(self.town)
                .or(self.village)
                .or(self.county)
                .unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            zip_code: self.postcode.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
        }
    }
}

/// Reverse geocoding client.
#[derive(Clone)]
pub struct GeocodeClient {
    client: reqwest::Client,
    base_url: Url,
}

impl GeocodeClient {
    /// Create a new geocoding client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Look up the address at `lat`/`long`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCoordinates` before any request if either coordinate
    /// is out of range, `NoResult` if the service knows no address there.
    #[instrument(skip(self))]
    pub async fn reverse(&self, lat: f64, long: f64) -> Result<Address, GeocodeError> {
        let coordinates = Coordinates::new(lat, long);
        coordinates.validate()?;

        let url = format!("{}/reverse", self.base_url.as_str().trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", long.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let body: ReverseResponse = serde_json::from_str(&response.text().await?)?;
        if let Some(error) = body.error {
            tracing::debug!(error = %error, "Geocoder found nothing");
            return Err(GeocodeError::NoResult);
        }

        let address = body.address.ok_or(GeocodeError::NoResult)?;
        Ok(Address {
            full_address: address.into_full_address(),
            coordinates,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_address_mapping() {
        let body: ReverseResponse = serde_json::from_str(
            r#"{
                "address": {
                    "house_number": "42",
                    "road": "80 Feet Road",
                    "suburb": "Koramangala",
                    "town": "Bengaluru",
                    "state": "Karnataka",
                    "postcode": "560034",
                    "country": "India"
                }
            }"#,
        )
        .unwrap();

        let full = body.address.unwrap().into_full_address();
        assert_eq!(full.flat_no, "42");
        assert_eq!(full.area, "80 Feet Road, Koramangala");
        assert_eq!(full.city, "Bengaluru");
        assert_eq!(full.zip_code, "560034");
    }

    #[test]
    fn test_sparse_address_leaves_blanks() {
        let full = ReverseAddress {
            village: Some("Hosur".to_string()),
            ..ReverseAddress::default()
        }
        .into_full_address();

        assert_eq!(full.city, "Hosur");
        assert!(full.flat_no.is_empty());
        assert!(full.area.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_coordinates_fail_before_request() {
        let client = GeocodeClient::new(&GeocoderConfig {
            base_url: Url::parse("http://127.0.0.1:9").unwrap(),
        })
        .unwrap();

        let err = client.reverse(95.0, 10.0).await.unwrap_err();
        assert!(matches!(err, GeocodeError::InvalidCoordinates(_)));
    }
}
