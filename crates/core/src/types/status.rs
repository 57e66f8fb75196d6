//! Status enums for customer and order entities.

use serde::{Deserialize, Serialize};

/// Customer gender as stored on the profile document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Parse the stored value, ignoring case. Unknown values yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Result of submitting an order to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OrderOutcome {
    /// The backend accepted the order.
    Placed { message: String },
    /// The delivery address is outside every outlet's service area.
    NoCoverage { message: String },
    /// Any other rejection.
    Failed { message: String },
}

/// Words the backend uses when an address falls outside delivery coverage.
const NO_COVERAGE_MARKERS: &[&str] = &["coverage", "serviceable", "deliverable", "service area"];

impl OrderOutcome {
    /// Classify a backend reply.
    ///
    /// `http_ok` is whether the response status was 2xx. `status` and
    /// `message` are the optional fields of the response body.
    #[must_use]
    pub fn classify(http_ok: bool, status: Option<&str>, message: Option<&str>) -> Self {
        let message_text = message.unwrap_or_default().to_owned();

        if http_ok && status.is_some_and(|s| s.trim().eq_ignore_ascii_case("success")) {
            let message = if message_text.is_empty() {
                "Order placed successfully".to_owned()
            } else {
                message_text
            };
            return Self::Placed { message };
        }

        let haystack = format!("{} {}", status.unwrap_or_default(), message_text).to_lowercase();
        if NO_COVERAGE_MARKERS.iter().any(|m| haystack.contains(m)) {
            let message = if message_text.is_empty() {
                "We do not deliver to this address yet".to_owned()
            } else {
                message_text
            };
            return Self::NoCoverage { message };
        }

        let message = if message_text.is_empty() {
            "Failed to place order, please try again".to_owned()
        } else {
            message_text
        };
        Self::Failed { message }
    }

    /// Whether the order went through.
    #[must_use]
    pub const fn is_placed(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }

    /// Message to show the customer.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Placed { message } | Self::NoCoverage { message } | Self::Failed { message } => {
                message
            }
        }
    }
}
