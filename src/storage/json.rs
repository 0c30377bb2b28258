use std::{
    fs::{self, File, OpenOptions, rename},
    io::Write,
    path::{Path, PathBuf},
};

use fs2::FileExt;
use serde_json::{Value, to_string_pretty};
use uuid::Uuid;

use crate::{
    models::session::{CURRENT_VERSION, StoredSession},
    storage::{SessionStorage, StorageError},
};

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[cfg(test)]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn lock(&self) -> Result<File, StorageError> {
        let lock_file_path = self.path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_file_path)
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path,
                source: e,
            })?;
        Ok(lock_file)
    }

    fn unlock(&self, lock_file: File) -> Result<(), StorageError> {
        lock_file.unlock().map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Returns 1 if the version field is missing (first versioned schema)
    fn detect_version(&self, value: &Value) -> Result<u32, StorageError> {
        match value.get("version") {
            Some(v) => serde_json::from_value::<u32>(v.clone()).map_err(|source| {
                StorageError::ParseFailed {
                    path: self.path.clone(),
                    source,
                }
            }),
            None => Ok(1),
        }
    }
}

/// Create `path` readable and writable by the owner only; it holds a bearer token
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())
}

impl SessionStorage for JsonFileStorage {
    fn load(&self) -> Result<StoredSession, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let mut data: Value =
                    serde_json::from_str(&content).map_err(|e| StorageError::ParseFailed {
                        path: self.path.clone(),
                        source: e,
                    })?;

                let file_version = self.detect_version(&data)?;
                if file_version > CURRENT_VERSION {
                    return Err(StorageError::FutureVersion(file_version));
                }

                if let Some(obj) = data.as_object_mut() {
                    obj.insert("version".to_string(), serde_json::json!(CURRENT_VERSION));
                }

                serde_json::from_value(data).map_err(|e| StorageError::ParseFailed {
                    path: self.path.clone(),
                    source: e,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredSession::default()),
            Err(e) => Err(StorageError::LoadFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::SaveFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json =
            to_string_pretty(session).map_err(|e| StorageError::SerializeFailed { source: e })?;

        let unique_temp = format!("{}.tmp.{}", self.path.display(), Uuid::new_v4());
        let temp_path = PathBuf::from(&unique_temp);
        write_private(&temp_path, &json).map_err(|e| StorageError::SaveFailed {
            path: temp_path.clone(),
            source: e,
        })?;

        let lock_file = self.lock()?;

        rename(&temp_path, &self.path).map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })?;

        self.unlock(lock_file)
    }

    fn clear(&self) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }

        let lock_file = self.lock()?;

        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StorageError::ClearFailed {
                    path: self.path.clone(),
                    source: e,
                });
            }
        }

        self.unlock(lock_file)
    }
}
