//! Catalog item types.
//!
//! Request bodies are deserialized into the raw `*Input` structs and then
//! validated into [`ItemFields`] or [`ItemPatch`], so the store only ever sees
//! values that satisfy the item rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atelier_core::{ItemId, Price, PriceError};

/// Item validation failures, reported to the client as field detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("name: must not be empty")]
    EmptyName,
    #[error("{0}")]
    Price(#[from] PriceError),
}

/// A stored catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: Price,
    pub description: String,
}

/// Body of `POST /items` and `PUT /items/{id}`.
#[derive(Debug, Deserialize)]
pub struct ItemInput {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
}

/// Validated values for every item column.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFields {
    pub name: String,
    pub price: Price,
    pub description: String,
}

impl TryFrom<ItemInput> for ItemFields {
    type Error = ItemError;

    fn try_from(input: ItemInput) -> Result<Self, Self::Error> {
        Ok(Self {
            name: validate_name(input.name)?,
            price: Price::new(input.price)?,
            description: input.description,
        })
    }
}

impl ItemFields {
    /// Attach an id to produce the stored item.
    #[must_use]
    pub fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            name: self.name,
            price: self.price,
            description: self.description,
        }
    }
}

/// Body of `PATCH /items/{id}`.
///
/// A missing key and an explicit `null` both mean "leave unchanged".
#[derive(Debug, Default, Deserialize)]
pub struct ItemPatchInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A validated partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub description: Option<String>,
}

impl TryFrom<ItemPatchInput> for ItemPatch {
    type Error = ItemError;

    fn try_from(input: ItemPatchInput) -> Result<Self, Self::Error> {
        Ok(Self {
            name: input.name.map(validate_name).transpose()?,
            price: input.price.map(Price::new).transpose()?,
            description: input.description,
        })
    }
}

impl ItemPatch {
    /// True when the patch sets no field.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.description.is_none()
    }

    /// Apply the present fields to `item`.
    #[must_use]
    pub fn apply(&self, mut item: Item) -> Item {
        if let Some(name) = &self.name {
            item.name.clone_from(name);
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(description) = &self.description {
            item.description.clone_from(description);
        }
        item
    }
}

/// Body of `DELETE /items/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

impl DeleteResponse {
    #[must_use]
    pub fn item_deleted() -> Self {
        Self {
            message: "Item deleted".to_string(),
        }
    }
}

fn validate_name(name: String) -> Result<String, ItemError> {
    if name.is_empty() {
        return Err(ItemError::EmptyName);
    }
    Ok(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shirt() -> Item {
        Item {
            id: ItemId::new(1),
            name: "Shirt".to_string(),
            price: Price::new(19.99).unwrap(),
            description: "cotton".to_string(),
        }
    }

    #[test]
    fn test_item_serializes_flat() {
        let json = serde_json::to_value(shirt()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "name": "Shirt",
                "price": 19.99,
                "description": "cotton"
            })
        );
    }

    #[test]
    fn test_fields_validation() {
        let ok = ItemFields::try_from(ItemInput {
            name: "Shirt".to_string(),
            price: 19.99,
            description: String::new(),
        });
        assert!(ok.is_ok());

        let empty_name = ItemFields::try_from(ItemInput {
            name: String::new(),
            price: 19.99,
            description: String::new(),
        });
        assert_eq!(empty_name.unwrap_err(), ItemError::EmptyName);

        let free = ItemFields::try_from(ItemInput {
            name: "Shirt".to_string(),
            price: 0.0,
            description: String::new(),
        });
        assert_eq!(
            free.unwrap_err(),
            ItemError::Price(PriceError::NotPositive)
        );
    }

    #[test]
    fn test_description_defaults_to_empty() {
        let input: ItemInput = serde_json::from_str(r#"{"name":"Hat","price":5}"#).unwrap();
        assert_eq!(input.description, "");
    }

    #[test]
    fn test_patch_distinguishes_absent_from_default() {
        let input: ItemPatchInput = serde_json::from_str(r#"{"description":""}"#).unwrap();
        let patch = ItemPatch::try_from(input).unwrap();
        assert_eq!(patch.name, None);
        assert_eq!(patch.price, None);
        assert_eq!(patch.description.as_deref(), Some(""));
    }

    #[test]
    fn test_patch_validates_present_fields() {
        let input: ItemPatchInput = serde_json::from_str(r#"{"price":-1}"#).unwrap();
        assert!(ItemPatch::try_from(input).is_err());

        let input: ItemPatchInput = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert_eq!(
            ItemPatch::try_from(input).unwrap_err(),
            ItemError::EmptyName
        );
    }

    #[test]
    fn test_patch_apply_only_touches_present_fields() {
        let patch = ItemPatch {
            price: Some(Price::new(24.99).unwrap()),
            ..ItemPatch::default()
        };
        let patched = patch.apply(shirt());

        assert_eq!(patched.name, "Shirt");
        assert_eq!(patched.description, "cotton");
        assert_eq!(patched.price, Price::new(24.99).unwrap());
    }

    #[test]
    fn test_empty_patch() {
        assert!(ItemPatch::default().is_empty());
        let patch = ItemPatch::try_from(ItemPatchInput::default()).unwrap();
        assert_eq!(patch.apply(shirt()), shirt());
    }
}
