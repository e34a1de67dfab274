use crate::domain::machine::Machine;
use crate::domain::ports::MachineStore;
use crate::error::{Result, VendingError};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Default location of the state file, relative to the working directory.
pub const DEFAULT_STATE_FILE: &str = "storage/vending_machine.json";

/// Keeps the machine snapshot in a single pretty-printed JSON document.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the old one, so a crash mid-write never leaves a truncated snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(path: &Path, machine: &Machine) -> Result<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, machine)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)
            .map_err(|e| VendingError::Persistence(format!("{}: {}", path.display(), e.error)))?;
        Ok(())
    }

    fn read(path: &Path) -> Result<Option<Machine>> {
        match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                VendingError::Persistence(format!("{} is not a valid snapshot: {e}", path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl MachineStore for JsonFileStore {
    async fn load(&self) -> Result<Machine> {
        let path = self.path.clone();
        run_blocking(move || match Self::read(&path)? {
            Some(machine) => Ok(machine),
            None => {
                let machine = Machine::seeded()?;
                Self::write(&path, &machine)?;
                tracing::info!(path = %path.display(), "seeded new state file");
                Ok(machine)
            }
        })
        .await
    }

    async fn save(&self, machine: &Machine) -> Result<()> {
        let path = self.path.clone();
        let machine = machine.clone();
        run_blocking(move || Self::write(&path, &machine)).await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| VendingError::Persistence(format!("storage task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::denomination::{Coin, Denomination};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_first_load_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let store = JsonFileStore::new(&path);

        let machine = store.load().await.unwrap();
        assert_eq!(machine, Machine::seeded().unwrap());
        assert!(path.exists());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["items"]["SODA"]["price"], serde_json::json!(1.5));
        assert_eq!(raw["availableChange"], serde_json::json!([1.0, 0.25, 0.1, 0.05]));
        assert_eq!(raw["insertedCoins"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));

        let mut machine = store.load().await.unwrap();
        machine.insert_coin(Coin::new(Denomination::Dollar));
        machine.insert_coin(Coin::new(Denomination::Dime));
        store.save(&machine).await.unwrap();

        let reloaded = JsonFileStore::new(store.path()).load().await.unwrap();
        assert_eq!(reloaded, machine);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_persistence_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(&path).load().await.unwrap_err();
        assert!(err.is_persistence());
    }

    #[tokio::test]
    async fn test_non_positive_price_is_persistence_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"insertedAmount": 0.0,
                "items": {"WATER": {"name": "Water", "price": -1.0, "quantity": 5}},
                "availableChange": [1.0, 0.25, 0.1, 0.05]}"#,
        )
        .unwrap();

        let err = JsonFileStore::new(&path).load().await.unwrap_err();
        assert!(err.is_persistence());
        assert!(err.to_string().contains("price must be positive"));
    }

    #[tokio::test]
    async fn test_accepts_snapshot_without_inserted_coins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"insertedAmount": 0.0,
                "items": {"WATER": {"name": "Water", "price": 0.65, "quantity": 5}},
                "availableChange": [1.0, 0.25, 0.1, 0.05]}"#,
        )
        .unwrap();

        let machine = JsonFileStore::new(&path).load().await.unwrap();
        assert_eq!(machine.items().len(), 1);
        assert!(machine.inserted_coins().is_empty());
    }
}
