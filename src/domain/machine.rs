use crate::domain::denomination::{Coin, Denomination};
use crate::domain::item::{Item, catalog_key};
use crate::domain::money::Money;
use crate::error::VendingError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Catalog a store seeds on first run: (display name, price, quantity).
pub const DEFAULT_CATALOG: [(&str, Decimal, u32); 3] = [
    ("Water", dec!(0.65), 5),
    ("Juice", dec!(1.00), 5),
    ("Soda", dec!(1.50), 5),
];

/// Change reserve a store seeds on first run.
pub const DEFAULT_CHANGE: [Denomination; 4] = Denomination::DESCENDING;

/// Requested change reserve: denomination value to coin count.
pub type ChangeConfig = BTreeMap<Decimal, i64>;

/// Upper bound on the coins a change configuration may load, per
/// denomination and in total.
pub const MAX_RESERVE_COINS: u32 = 10_000;

/// The machine aggregate. Loaded whole from a store at the start of every
/// operation and written back whole at the end.
///
/// `inserted_amount` always equals the sum of `inserted_coins`; both are only
/// changed together through [`Machine::insert_coin`] and
/// [`Machine::take_inserted_coins`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    inserted_amount: Money,
    items: BTreeMap<String, Item>,
    available_change: Vec<Coin>,
    #[serde(default)]
    inserted_coins: Vec<Coin>,
}

impl Machine {
    pub fn new(items: impl IntoIterator<Item = Item>, available_change: Vec<Coin>) -> Self {
        Self {
            inserted_amount: Money::ZERO,
            items: items.into_iter().map(|item| (item.key(), item)).collect(),
            available_change,
            inserted_coins: Vec::new(),
        }
    }

    /// The first-run state built from [`DEFAULT_CATALOG`] and [`DEFAULT_CHANGE`].
    pub fn seeded() -> Result<Self, VendingError> {
        let items = DEFAULT_CATALOG
            .iter()
            .map(|&(name, price, quantity)| Item::new(name, Money::new(price), quantity))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(
            items,
            DEFAULT_CHANGE.into_iter().map(Coin::new).collect(),
        ))
    }

    pub fn inserted_amount(&self) -> Money {
        self.inserted_amount
    }

    pub fn inserted_coins(&self) -> &[Coin] {
        &self.inserted_coins
    }

    pub fn available_change(&self) -> &[Coin] {
        &self.available_change
    }

    pub fn items(&self) -> &BTreeMap<String, Item> {
        &self.items
    }

    pub fn item(&self, name: &str) -> Option<&Item> {
        self.items.get(&catalog_key(name))
    }

    pub fn item_mut(&mut self, name: &str) -> Option<&mut Item> {
        self.items.get_mut(&catalog_key(name))
    }

    pub fn has_open_transaction(&self) -> bool {
        self.inserted_amount.is_positive()
    }

    pub fn insert_coin(&mut self, coin: Coin) -> Money {
        self.inserted_coins.push(coin);
        self.inserted_amount += coin.denomination().money();
        self.inserted_amount
    }

    /// Closes the open transaction, handing back the inserted coins in
    /// insertion order.
    pub fn take_inserted_coins(&mut self) -> Vec<Coin> {
        self.inserted_amount = Money::ZERO;
        std::mem::take(&mut self.inserted_coins)
    }

    /// The reserve plus the coins of the open transaction.
    pub fn change_pool(&self) -> Vec<Coin> {
        self.available_change
            .iter()
            .chain(self.inserted_coins.iter())
            .copied()
            .collect()
    }

    pub fn set_available_change(&mut self, coins: Vec<Coin>) {
        self.available_change = coins;
    }
}

/// Expands a change configuration into a coin reserve, largest denomination
/// first.
pub fn coins_from_config(config: &ChangeConfig) -> Result<Vec<Coin>, VendingError> {
    let mut counts = BTreeMap::new();
    for (&value, &count) in config {
        let denomination = Denomination::from_value(value).ok_or_else(|| {
            VendingError::InvalidRestockInput(format!(
                "Invalid denomination in change configuration: {value}"
            ))
        })?;
        if count < 0 {
            return Err(VendingError::InvalidRestockInput(format!(
                "Coin count for denomination {value} cannot be negative."
            )));
        }
        let count = u32::try_from(count)
            .ok()
            .filter(|&count| count <= MAX_RESERVE_COINS)
            .ok_or_else(|| {
                VendingError::InvalidRestockInput(format!(
                    "Coin count for denomination {value} is too large."
                ))
            })?;
        counts.insert(denomination, count);
    }

    if counts.values().sum::<u32>() > MAX_RESERVE_COINS {
        return Err(VendingError::InvalidRestockInput(format!(
            "Change configuration exceeds {MAX_RESERVE_COINS} coins."
        )));
    }

    Ok(Denomination::DESCENDING
        .into_iter()
        .flat_map(|d| {
            let count = counts.get(&d).copied().unwrap_or(0);
            std::iter::repeat_n(Coin::new(d), count as usize)
        })
        .collect())
}
