use crate::domain::machine::Machine;
use crate::domain::ports::MachineStore;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory machine store.
///
/// Clones share the same snapshot. Ideal for tests or a throwaway machine
/// where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryMachineStore {
    machine: Arc<RwLock<Option<Machine>>>,
}

impl InMemoryMachineStore {
    /// Creates an empty store; the first `load` seeds the default machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `machine`.
    pub fn with_machine(machine: Machine) -> Self {
        Self {
            machine: Arc::new(RwLock::new(Some(machine))),
        }
    }
}

#[async_trait]
impl MachineStore for InMemoryMachineStore {
    async fn load(&self) -> Result<Machine> {
        if let Some(machine) = self.machine.read().await.as_ref() {
            return Ok(machine.clone());
        }
        let mut slot = self.machine.write().await;
        let machine = match slot.take() {
            Some(machine) => machine,
            None => Machine::seeded()?,
        };
        *slot = Some(machine.clone());
        Ok(machine)
    }

    async fn save(&self, machine: &Machine) -> Result<()> {
        *self.machine.write().await = Some(machine.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::denomination::{Coin, Denomination};

    #[tokio::test]
    async fn test_load_seeds_empty_store() {
        let store = InMemoryMachineStore::new();
        let machine = store.load().await.unwrap();
        assert_eq!(machine, Machine::seeded().unwrap());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = InMemoryMachineStore::new();
        let mut machine = store.load().await.unwrap();
        machine.insert_coin(Coin::new(Denomination::Quarter));
        store.save(&machine).await.unwrap();

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded, machine);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryMachineStore::new();
        let other = store.clone();
        let mut machine = store.load().await.unwrap();
        machine.set_available_change(Vec::new());
        store.save(&machine).await.unwrap();

        assert!(other.load().await.unwrap().available_change().is_empty());
    }
}
