//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. All EggBucket IDs are
//! opaque strings assigned by the backend.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<&str>`, `From<String>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use eggbucket_core::define_id;
/// define_id!(CouponId);
/// define_id!(OutletId);
///
/// let coupon = CouponId::new("WELCOME10");
/// let outlet = OutletId::new("BLR-1");
///
/// // These are different types, so this won't compile:
/// // let _: CouponId = outlet;
/// assert_eq!(coupon.as_str(), "WELCOME10");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(OrderId);

/// Image shown for products the catalog sends without artwork.
pub const DEFAULT_PRODUCT_IMAGE: &str = "/images/six.jpg";

impl ProductId {
    /// Map a legacy numeric catalog id to its product code.
    ///
    /// Older catalog payloads numbered the trays in listing order
    /// (30, 6, 12). Unknown numbers keep their decimal form.
    #[must_use]
    pub fn from_legacy(id: i64) -> Self {
        match id {
            1 => Self::new("E30"),
            2 => Self::new("E6"),
            3 => Self::new("E12"),
            other => Self::new(other.to_string()),
        }
    }

    /// Image reference for this product code, used when the catalog has none.
    #[must_use]
    pub fn default_image(&self) -> &'static str {
        match self.0.to_ascii_uppercase().as_str() {
            "E12" => "/images/twelve.jpg",
            "E30" => "/images/thirty.jpg",
            _ => DEFAULT_PRODUCT_IMAGE,
        }
    }
}

impl OrderId {
    /// Short order number shown to customers.
    ///
    /// Backend document ids look like `ORD-1042`; the second `-`-separated
    /// segment is the customer-facing number. Ids without a `-` are shown whole.
    #[must_use]
    pub fn display_number(&self) -> &str {
        self.0.split('-').nth(1).unwrap_or(&self.0)
    }
}

/// Identifier as it arrives from older backend payloads: either a string
/// code or a bare number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawProductId {
    Code(String),
    Legacy(i64),
}

impl From<RawProductId> for ProductId {
    fn from(raw: RawProductId) -> Self {
        match raw {
            RawProductId::Code(code) => Self::new(code.trim().to_ascii_uppercase()),
            RawProductId::Legacy(id) => Self::from_legacy(id),
        }
    }
}
