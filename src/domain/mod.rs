//! Domain layer: money, coins, the catalog and the change algorithm.
//!
//! Nothing in here performs I/O. Stores are reached through [`ports`].

pub mod change;
pub mod denomination;
pub mod item;
pub mod machine;
pub mod money;
pub mod ports;
