use crate::domain::money::Money;
use crate::error::VendingError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reads a coin value from its textual form without going through `f64`.
///
/// Digits are kept exactly as written, so `0.25000000000000001` stays
/// distinct from a quarter. Scientific notation (`2.5e-1`) is accepted.
pub fn parse_coin_value(text: &str) -> Result<Decimal, VendingError> {
    let text = text.trim();
    Decimal::from_str_exact(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| VendingError::UnreadableCoin(text.to_string()))
}

/// The closed set of coin face values the machine accepts and pays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub enum Denomination {
    Nickel,
    Dime,
    Quarter,
    Dollar,
}

impl Denomination {
    /// Largest first. The change dispenser walks the pool in this order.
    pub const DESCENDING: [Denomination; 4] = [
        Denomination::Dollar,
        Denomination::Quarter,
        Denomination::Dime,
        Denomination::Nickel,
    ];

    pub const fn value(self) -> Decimal {
        match self {
            Denomination::Nickel => dec!(0.05),
            Denomination::Dime => dec!(0.10),
            Denomination::Quarter => dec!(0.25),
            Denomination::Dollar => dec!(1.00),
        }
    }

    pub fn money(self) -> Money {
        Money::new(self.value())
    }

    /// Position in [`Denomination::DESCENDING`].
    pub(crate) const fn rank(self) -> usize {
        match self {
            Denomination::Dollar => 0,
            Denomination::Quarter => 1,
            Denomination::Dime => 2,
            Denomination::Nickel => 3,
        }
    }

    /// Exact match against the registry. `0.1` and `0.10` are the same value;
    /// `0.099` is not a dime.
    pub fn from_value(value: Decimal) -> Option<Self> {
        Self::DESCENDING.into_iter().find(|d| d.value() == value)
    }

    pub fn is_valid(value: Decimal) -> bool {
        Self::from_value(value).is_some()
    }
}

impl TryFrom<Decimal> for Denomination {
    type Error = VendingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or(VendingError::InvalidCoin(value))
    }
}

impl From<Denomination> for Decimal {
    fn from(denomination: Denomination) -> Self {
        denomination.value()
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A single physical coin, either sitting in the change reserve or inserted
/// by the customer in the open transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coin(Denomination);

impl Coin {
    pub const fn new(denomination: Denomination) -> Self {
        Self(denomination)
    }

    pub fn denomination(&self) -> Denomination {
        self.0
    }

    pub fn value(&self) -> Decimal {
        self.0.value()
    }
}

impl From<Denomination> for Coin {
    fn from(denomination: Denomination) -> Self {
        Self(denomination)
    }
}

impl TryFrom<Decimal> for Coin {
    type Error = VendingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Denomination::try_from(value).map(Coin)
    }
}
