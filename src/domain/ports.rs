use super::machine::Machine;
use crate::error::Result;
use async_trait::async_trait;

/// Durable home of the machine snapshot.
///
/// `load` seeds and persists [`Machine::seeded`] when the store is empty.
/// `save` fully overwrites whatever was stored before.
#[async_trait]
pub trait MachineStore: Send + Sync {
    async fn load(&self) -> Result<Machine>;
    async fn save(&self, machine: &Machine) -> Result<()>;
}

pub type MachineStoreBox = Box<dyn MachineStore>;
