//! A directory holding one TOML record per entity, named `<id>.toml`.

use super::atomic_toml::AtomicTomlFile;
use redraft_core::{RedraftError, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RecordDir {
    root: PathBuf,
}

impl RecordDir {
    /// Opens the directory, creating it if needed.
    pub fn open(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the file handle for the record with the given ID.
    ///
    /// IDs become file names, so anything that could escape the directory is
    /// rejected.
    pub fn file<T>(&self, id: &str) -> Result<AtomicTomlFile<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let valid = !id.is_empty()
            && !id.starts_with('.')
            && !id.contains(['/', '\\'])
            && !id.contains("..");
        if !valid {
            return Err(RedraftError::validation(format!("Invalid record id '{}'", id)));
        }
        Ok(AtomicTomlFile::new(self.root.join(format!("{}.toml", id))))
    }

    /// Loads every record in the directory.
    ///
    /// Temp files and lock files are skipped; unreadable records are logged
    /// and skipped so one corrupt file does not hide the rest.
    pub fn load_all<T>(&self) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut records = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_record = path.extension().is_some_and(|ext| ext == "toml")
                && path
                    .file_name()
                    .is_some_and(|name| !name.to_string_lossy().starts_with('.'));
            if !is_record {
                continue;
            }

            match AtomicTomlFile::<T>::new(path.clone()).load() {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("[RecordDir] Skipping unreadable {}: {}", path.display(), e);
                }
            }
        }

        Ok(records)
    }
}

/// Runs blocking file work off the async executor.
pub(crate) async fn run_blocking<R, F>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RedraftError::internal(format!("Blocking storage task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let temp_dir = TempDir::new().unwrap();
        let dir = RecordDir::open(temp_dir.path().join("notes")).unwrap();

        for id in ["", "../x", "a/b", "a\\b", ".hidden"] {
            assert!(dir.file::<Note>(id).unwrap_err().is_validation(), "{id}");
        }
        assert!(dir.file::<Note>("abc-123").is_ok());
    }

    #[test]
    fn test_load_all_skips_lock_and_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = RecordDir::open(temp_dir.path().to_path_buf()).unwrap();
        dir.file::<Note>("a")
            .unwrap()
            .save(&Note { id: "a".into() })
            .unwrap();
        fs::write(temp_dir.path().join(".b.toml.tmp"), "id = \"b\"").unwrap();
        fs::write(temp_dir.path().join("broken.toml"), "id = ").unwrap();

        let notes: Vec<Note> = dir.load_all().unwrap();
        assert_eq!(notes, vec![Note { id: "a".into() }]);
    }
}
