//! Order submission payload and order history records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::address::Address;
use super::id::{OrderId, ProductId};

/// Product code to quantity, as the order endpoint expects it.
pub type OrderLines = BTreeMap<ProductId, u32>;

/// Body of `POST /api/v1/order/place`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub address: Address,
    /// Cart total including shipping, in rupees.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub products: OrderLines,
    /// Customer phone without the leading `+` (`91XXXXXXXXXX`).
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
}

/// One past order as listed in the customer's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: OrderId,
    #[serde(default)]
    pub products: BTreeMap<String, u32>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl OrderRecord {
    /// Sort records newest first. Records without a creation time go last.
    pub fn sort_newest_first(records: &mut [Self]) {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    /// Customer-facing order number.
    #[must_use]
    pub fn display_number(&self) -> &str {
        self.id.display_number()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::address::FullAddress;

    fn record(id: &str, created: Option<i64>) -> OrderRecord {
        OrderRecord {
            id: OrderId::new(id),
            products: BTreeMap::new(),
            amount: Decimal::new(42, 0),
            status: None,
            created_at: created.map(|secs| Utc.timestamp_opt(secs, 0).unwrap()),
            updated_at: None,
        }
    }

    #[test]
    fn test_sort_newest_first() {
        let mut records = vec![
            record("ORD-1", Some(100)),
            record("ORD-2", None),
            record("ORD-3", Some(300)),
            record("ORD-4", Some(200)),
        ];
        OrderRecord::sort_newest_first(&mut records);

        let ids: Vec<_> = records.iter().map(OrderRecord::display_number).collect();
        assert_eq!(ids, ["3", "4", "1", "2"]);
    }

    #[test]
    fn test_payload_wire_format() {
        let mut products = OrderLines::new();
        products.insert(ProductId::new("E6"), 2);
        products.insert(ProductId::new("E30"), 1);

        let payload = OrderPayload {
            address: Address {
                full_address: FullAddress {
                    flat_no: "1".to_owned(),
                    area: "A".to_owned(),
                    city: "C".to_owned(),
                    state: "S".to_owned(),
                    zip_code: "5".to_owned(),
                    country: "IN".to_owned(),
                },
                coordinates: crate::types::address::Coordinates::default(),
            },
            amount: Decimal::new(293, 0),
            products,
            customer_id: "919876543210".to_owned(),
            customer_name: None,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["amount"], 293.0);
        assert_eq!(value["products"]["E6"], 2);
        assert_eq!(value["products"]["E30"], 1);
        assert_eq!(value["customerId"], "919876543210");
        assert!(value.get("customerName").is_none());
        assert_eq!(value["address"]["fullAddress"]["zipCode"], "5");
    }

    #[test]
    fn test_record_accepts_backend_shape() {
        let json = r#"{
            "id": "ORD-1042",
            "products": {"E6": 2},
            "amount": 84,
            "createdAt": "2024-11-02T10:15:00Z",
            "updatedAt": null
        }"#;
        let record: OrderRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.display_number(), "1042");
        assert_eq!(record.amount, Decimal::new(84, 0));
        assert_eq!(record.products["E6"], 2);
        assert!(record.created_at.is_some());
    }
}
