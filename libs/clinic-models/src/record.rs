//! Stored-row wrapper shared by most entities.

use serde::{Deserialize, Serialize};

/// A persisted row: the store-assigned id plus the insertable fields.
///
/// Serializes flat, so a `Record<NewInvoice>` is `{"id": 1, "patientId": ...}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: i32,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Record<T> {
    pub fn new(id: i32, data: T) -> Self {
        Self { id, data }
    }
}

impl<T> std::ops::Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Row {
        item_name: String,
        quantity: i32,
    }

    #[test]
    fn serializes_flat() {
        let record = Record::new(
            7,
            Row {
                item_name: "Alginate".to_string(),
                quantity: 3,
            },
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"id": 7, "itemName": "Alginate", "quantity": 3})
        );
        assert_eq!(record.item_name, "Alginate");
    }
}
