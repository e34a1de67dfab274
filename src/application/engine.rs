use crate::application::response::VendingResponse;
use crate::domain::change;
use crate::domain::denomination::{Coin, parse_coin_value};
use crate::domain::item::Item;
use crate::domain::machine::{ChangeConfig, Machine, coins_from_config};
use crate::domain::money::Money;
use crate::domain::ports::MachineStoreBox;
use crate::error::{Result, VendingError};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertedAmount {
    inserted_amount: Money,
}

#[derive(Debug, Serialize)]
struct Sale {
    item: String,
    price: Money,
    change: Vec<Coin>,
}

#[derive(Debug, Serialize)]
struct ReturnedCoins {
    coins: Vec<Coin>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct RestockReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_change: Option<Vec<Coin>>,
}

#[derive(Debug, Serialize)]
struct Inventory {
    items: BTreeMap<String, Item>,
}

/// The transaction engine.
///
/// Every operation is one load, mutate, save cycle against the store, and the
/// store sits behind a mutex so two requests can never interleave between
/// each other's load and save. A failed operation drops its snapshot without
/// saving, so nothing partial is ever persisted.
///
/// Operations never return `Err`: every failure becomes a
/// [`VendingResponse::failure`] carrying the error's message.
pub struct VendingEngine {
    store: Mutex<MachineStoreBox>,
}

impl VendingEngine {
    /// Creates a new `VendingEngine` over the given store.
    pub fn new(store: MachineStoreBox) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Adds a coin to the open transaction and reports the new balance.
    pub async fn insert_coin(&self, value: Decimal) -> VendingResponse {
        let result = self.try_insert_coin(value).await;
        respond("insert_coin", "Coin inserted.", result)
    }

    /// Like [`VendingEngine::insert_coin`], for a value still in the textual
    /// form it arrived in.
    pub async fn insert_coin_text(&self, text: &str) -> VendingResponse {
        let result = match parse_coin_value(text) {
            Ok(value) => self.try_insert_coin(value).await,
            Err(e) => Err(e),
        };
        respond("insert_coin", "Coin inserted.", result)
    }

    /// Sells one unit of `name`, paying back any change owed.
    pub async fn select_item(&self, name: &str) -> VendingResponse {
        let result = self.try_select_item(name).await;
        respond("select_item", "Item dispensed.", result)
    }

    /// Refunds every coin of the open transaction, in insertion order.
    pub async fn return_coins(&self) -> VendingResponse {
        let result = self.try_return_coins().await;
        respond("return_coins", "Coins returned.", result)
    }

    /// Restocks an item, replaces the change reserve, or both.
    ///
    /// An empty `name` means no item is being restocked. When both parts are
    /// given they are validated together and saved once.
    pub async fn restock_item(
        &self,
        name: &str,
        amount: i64,
        change_config: Option<ChangeConfig>,
    ) -> VendingResponse {
        let result = self.try_restock_item(name, amount, change_config).await;
        respond("restock_item", "Restock completed.", result)
    }

    pub async fn inventory(&self) -> VendingResponse {
        let result = self.try_inventory().await;
        respond("inventory", "Inventory retrieved.", result)
    }

    pub async fn inserted_amount(&self) -> VendingResponse {
        let result = self.try_inserted_amount().await;
        respond("inserted_amount", "Inserted amount retrieved.", result)
    }

    async fn try_insert_coin(&self, value: Decimal) -> Result<InsertedAmount> {
        let coin = Coin::try_from(value)?;

        let store = self.store.lock().await;
        let mut machine = store.load().await?;
        let inserted_amount = machine.insert_coin(coin);
        store.save(&machine).await?;

        tracing::info!(coin = %coin.value(), balance = %inserted_amount, "coin inserted");
        Ok(InsertedAmount { inserted_amount })
    }

    async fn try_select_item(&self, name: &str) -> Result<Sale> {
        let store = self.store.lock().await;
        let mut machine = store.load().await?;

        let sale = sell(&mut machine, name)?;
        store.save(&machine).await?;

        tracing::info!(
            item = %sale.item,
            price = %sale.price,
            change_coins = sale.change.len(),
            "item dispensed"
        );
        Ok(sale)
    }

    async fn try_return_coins(&self) -> Result<ReturnedCoins> {
        let store = self.store.lock().await;
        let mut machine = store.load().await?;

        if !machine.has_open_transaction() {
            return Err(VendingError::NoActiveBalance);
        }
        let coins = machine.take_inserted_coins();
        store.save(&machine).await?;

        tracing::info!(coins = coins.len(), "coins returned");
        Ok(ReturnedCoins { coins })
    }

    async fn try_restock_item(
        &self,
        name: &str,
        amount: i64,
        change_config: Option<ChangeConfig>,
    ) -> Result<RestockReport> {
        let name = name.trim();
        if name.is_empty() && change_config.is_none() {
            return Err(VendingError::InvalidRestockInput(
                "No restock or change configuration provided.".to_string(),
            ));
        }

        let store = self.store.lock().await;
        let mut machine = store.load().await?;
        let mut report = RestockReport::default();

        if !name.is_empty() {
            let item = machine
                .item_mut(name)
                .ok_or_else(|| VendingError::RestockItemNotFound(name.to_string()))?;
            let quantity = item.restock(amount)?;
            report.item = Some(item.name().to_string());
            report.quantity = Some(quantity);
        }

        if let Some(config) = change_config {
            let coins = coins_from_config(&config)?;
            machine.set_available_change(coins.clone());
            report.available_change = Some(coins);
        }

        store.save(&machine).await?;

        tracing::info!(
            item = report.item.as_deref().unwrap_or("-"),
            quantity = report.quantity,
            change_replaced = report.available_change.is_some(),
            "restock applied"
        );
        Ok(report)
    }

    async fn try_inventory(&self) -> Result<Inventory> {
        let store = self.store.lock().await;
        let machine = store.load().await?;
        Ok(Inventory {
            items: machine.items().clone(),
        })
    }

    async fn try_inserted_amount(&self) -> Result<InsertedAmount> {
        let store = self.store.lock().await;
        let machine = store.load().await?;
        Ok(InsertedAmount {
            inserted_amount: machine.inserted_amount(),
        })
    }
}

/// Applies a sale to an in-memory snapshot.
///
/// Stock is checked before funds. Change is computed against the reserve plus
/// the inserted coins before anything is mutated, so an error leaves the
/// snapshot as it was.
fn sell(machine: &mut Machine, name: &str) -> Result<Sale> {
    let item = machine
        .item(name)
        .ok_or_else(|| VendingError::ItemNotFound(name.to_string()))?;
    if !item.in_stock() {
        return Err(VendingError::OutOfStock(item.name().to_string()));
    }
    if machine.inserted_amount() < item.price() {
        return Err(VendingError::InsufficientFunds);
    }

    let item_name = item.name().to_string();
    let price = item.price();
    let change_amount = (machine.inserted_amount() - price).round_cents();
    let dispensed = change::dispense(&machine.change_pool(), change_amount)?;

    machine
        .item_mut(name)
        .ok_or_else(|| VendingError::ItemNotFound(name.to_string()))?
        .dispense()?;
    machine.take_inserted_coins();
    machine.set_available_change(dispensed.remaining);

    Ok(Sale {
        item: item_name,
        price,
        change: dispensed.coins,
    })
}

fn respond<T: Serialize>(operation: &str, message: &str, result: Result<T>) -> VendingResponse {
    match result {
        Ok(payload) => VendingResponse::success(message, payload),
        Err(e) if e.is_persistence() => {
            tracing::error!(operation, error = %e, "operation aborted by storage failure");
            VendingResponse::fatal(e.to_string())
        }
        Err(VendingError::NoActiveBalance) => {
            tracing::debug!(operation, "nothing to return");
            VendingResponse::failure(VendingError::NoActiveBalance.to_string())
        }
        Err(e) => {
            tracing::warn!(operation, error = %e, "operation rejected");
            VendingResponse::failure(e.to_string())
        }
    }
}
