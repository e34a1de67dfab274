//! Greedy change dispensing over the fixed denominations.
//!
//! The pool is tallied per denomination and walked largest first. A coin is
//! taken while it does not overshoot the remaining amount. If anything is
//! left once every denomination has been tried, the whole dispense fails and
//! the caller's pool is untouched.

use crate::domain::denomination::{Coin, Denomination};
use crate::domain::money::Money;
use crate::error::{Result, VendingError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Absorbs rounding noise when comparing the remaining amount to a coin.
const TOLERANCE: Decimal = dec!(0.001);

/// Result of a successful dispense.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispensed {
    /// Coins paid out, in the order they were picked.
    pub coins: Vec<Coin>,
    /// What is left of the pool.
    pub remaining: Vec<Coin>,
}

/// Per-denomination coin counts, indexed by [`Denomination::rank`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally([usize; 4]);

impl Tally {
    pub fn of(coins: &[Coin]) -> Self {
        let mut tally = Self::default();
        for coin in coins {
            tally.0[coin.denomination().rank()] += 1;
        }
        tally
    }

    pub fn count(&self, denomination: Denomination) -> usize {
        self.0[denomination.rank()]
    }

    fn take(&mut self, denomination: Denomination) {
        self.0[denomination.rank()] -= 1;
    }

    /// Expands the tally back into coins, largest denomination first.
    pub fn into_coins(self) -> Vec<Coin> {
        Denomination::DESCENDING
            .into_iter()
            .flat_map(|d| std::iter::repeat_n(Coin::new(d), self.count(d)))
            .collect()
    }
}

/// Pays out exactly `amount` from `pool`.
///
/// A zero (or negative) amount dispenses nothing and hands the pool back in
/// its original order.
pub fn dispense(pool: &[Coin], amount: Money) -> Result<Dispensed> {
    let mut remaining_amount = amount.round_cents();
    if !remaining_amount.is_positive() {
        return Ok(Dispensed {
            coins: Vec::new(),
            remaining: pool.to_vec(),
        });
    }

    let mut tally = Tally::of(pool);
    let mut coins = Vec::new();

    for denomination in Denomination::DESCENDING {
        while tally.count(denomination) > 0
            && remaining_amount.value() + TOLERANCE >= denomination.value()
        {
            coins.push(Coin::new(denomination));
            remaining_amount = (remaining_amount - denomination.money()).round_cents();
            tally.take(denomination);
        }
    }

    if remaining_amount.value() > TOLERANCE {
        return Err(VendingError::ChangeUnavailable);
    }

    Ok(Dispensed {
        coins,
        remaining: tally.into_coins(),
    })
}
