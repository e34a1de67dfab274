use crate::application::engine::VendingEngine;
use crate::application::response::VendingResponse;
use crate::domain::machine::ChangeConfig;
use crate::error::{Result, VendingError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// Machine operations a script row can request.
#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Insert,
    Select,
    Return,
    Restock,
    Inventory,
    Balance,
}

/// One row of a command script: `op, item, value, amount, change`.
///
/// `value` stays text until it reaches the engine so coin matching sees the
/// digits as written. `change` is a restock reserve such as `0.25:4;0.05:2`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Command {
    pub op: Operation,
    pub item: Option<String>,
    pub value: Option<String>,
    pub amount: Option<i64>,
    #[serde(default)]
    pub change: Option<String>,
}

/// Parses a `value:count` list separated by `;` into a change configuration.
pub fn parse_change_config(text: &str) -> Result<ChangeConfig> {
    let mut config = ChangeConfig::new();
    for entry in text.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let invalid =
            || VendingError::InvalidRestockInput(format!("Invalid change entry: {entry}"));
        let (value, count) = entry.split_once(':').ok_or_else(invalid)?;
        let value = Decimal::from_str_exact(value.trim()).map_err(|_| invalid())?;
        let count = count.trim().parse::<i64>().map_err(|_| invalid())?;
        config.insert(value, count);
    }
    Ok(config)
}

impl Command {
    /// Runs the command against `engine`. Missing arguments produce a
    /// failure outcome rather than an error.
    pub async fn execute(self, engine: &VendingEngine) -> VendingResponse {
        let item = self.item.unwrap_or_default();
        match self.op {
            Operation::Insert => match self.value {
                Some(value) => engine.insert_coin_text(&value).await,
                None => VendingResponse::failure("Missing coin value."),
            },
            Operation::Select => engine.select_item(&item).await,
            Operation::Return => engine.return_coins().await,
            Operation::Restock => {
                let change_config = match self.change.as_deref().map(parse_change_config) {
                    Some(Ok(config)) => Some(config),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "rejected change column");
                        return VendingResponse::failure(e.to_string());
                    }
                    None => None,
                };
                engine
                    .restock_item(&item, self.amount.unwrap_or(0), change_config)
                    .await
            }
            Operation::Inventory => engine.inventory().await,
            Operation::Balance => engine.inserted_amount().await,
        }
    }
}

/// Streams [`Command`]s out of a headed command script.
///
/// Fields are trimmed and trailing columns may be left off, so `return` on
/// its own is a complete row.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// One item per data row. A row that does not parse yields an error
    /// without ending the stream.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(VendingError::from))
    }
}
