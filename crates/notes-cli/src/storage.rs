use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notes_sync::KeyValueStore;
use serde_json::Value;

/// One JSON file per key inside a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Get the default draft directory
    pub fn default_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("notes")
            .join("drafts");
        Ok(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);

        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;

        let value = serde_json::from_str(&contents)
            .with_context(|| format!("Could not parse {}", path.display()))?;

        Ok(Some(value))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        fs::create_dir_all(&self.dir).context("Could not create draft directory")?;

        let path = self.path_for(key);
        let contents = serde_json::to_string_pretty(&value)
            .context("Could not serialize value")?;

        fs::write(&path, contents)
            .with_context(|| format!("Could not write {}", path.display()))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);

        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Could not delete {}", path.display()))?;
        }

        Ok(())
    }
}
