use std::{collections::BTreeMap, io::ErrorKind, path::PathBuf, sync::Arc};

use anyhow::Context;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::warn;

use climate_common::{Checkpoint, RuntimeConfig};

#[derive(Clone)]
pub struct AppStore {
    runtime_path: Arc<PathBuf>,
    checkpoint_path: Arc<PathBuf>,
}

impl AppStore {
    pub fn new() -> Self {
        let data_dir = std::env::var("CLIMATE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.climate"));
        Self::in_dir(data_dir)
    }

    pub fn in_dir(data_dir: PathBuf) -> Self {
        Self {
            runtime_path: Arc::new(data_dir.join("runtime.json")),
            checkpoint_path: Arc::new(data_dir.join("checkpoint.json")),
        }
    }

    pub async fn load_runtime_config(&self) -> anyhow::Result<RuntimeConfig> {
        match tokio::fs::read(self.runtime_path.as_ref()).await {
            Ok(raw) => serde_json::from_slice::<RuntimeConfig>(&raw)
                .with_context(|| format!("invalid {}", self.runtime_path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(RuntimeConfig::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn open_checkpoint(&self) -> anyhow::Result<FileCheckpoint> {
        let path = self.checkpoint_path.as_ref().clone();
        let values = match tokio::fs::read(&path).await {
            Ok(raw) => serde_json::from_slice::<BTreeMap<String, f32>>(&raw)
                .with_context(|| format!("invalid {}", path.display()))?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(FileCheckpoint { path, values })
    }
}

#[derive(Debug)]
pub struct FileCheckpoint {
    path: PathBuf,
    values: BTreeMap<String, f32>,
}

impl FileCheckpoint {
    fn persist(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(&self.values)?;
        std::fs::write(&self.path, payload)?;
        Ok(())
    }

    // Called from the engine task; the write is synchronous like the engine.
    fn persist_blocking(&self) -> anyhow::Result<()> {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| self.persist())
            }
            _ => self.persist(),
        }
    }
}

impl Checkpoint for FileCheckpoint {
    fn get(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), value);
        if let Err(err) = self.persist_blocking() {
            warn!("failed to persist checkpoint {key}: {err:#}");
        }
    }
}
