use crate::domain::money::Money;
use crate::error::VendingError;
use serde::{Deserialize, Deserializer, Serialize};

/// Normalizes a human-entered item name into its catalog key.
///
/// Every catalog read and write goes through this, which is what makes
/// selection case-insensitive ("water", "Water" and "WATER" all hit `WATER`).
pub fn catalog_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// A sellable product slot.
///
/// The price is always positive, whether the item was built with
/// [`Item::new`] or read back from a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    name: String,
    #[serde(deserialize_with = "positive_price")]
    price: Money,
    quantity: u32,
}

fn positive_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    let price = Money::deserialize(deserializer)?;
    if price.is_positive() {
        Ok(price)
    } else {
        Err(serde::de::Error::custom(format!(
            "price must be positive, got {price}"
        )))
    }
}

impl Item {
    pub fn new(name: impl Into<String>, price: Money, quantity: u32) -> Result<Self, VendingError> {
        if !price.is_positive() {
            return Err(VendingError::ValidationError(
                "Price must be positive".to_string(),
            ));
        }
        Ok(Self {
            name: name.into(),
            price,
            quantity,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn key(&self) -> String {
        catalog_key(&self.name)
    }

    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Removes one unit from stock.
    pub fn dispense(&mut self) -> Result<(), VendingError> {
        if self.quantity == 0 {
            return Err(VendingError::OutOfStock(self.name.clone()));
        }
        self.quantity -= 1;
        Ok(())
    }

    /// Adds `amount` units to stock. Negative amounts are rejected and leave
    /// the quantity untouched.
    pub fn restock(&mut self, amount: i64) -> Result<u32, VendingError> {
        if amount < 0 {
            return Err(VendingError::InvalidRestockInput(
                "Cannot increase quantity by a negative number.".to_string(),
            ));
        }
        let added = u32::try_from(amount).map_err(|_| {
            VendingError::InvalidRestockInput(format!("Restock amount {amount} is too large."))
        })?;
        self.quantity = self.quantity.checked_add(added).ok_or_else(|| {
            VendingError::InvalidRestockInput(format!("Restock amount {amount} is too large."))
        })?;
        Ok(self.quantity)
    }
}
