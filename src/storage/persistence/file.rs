//! Plain file backend with atomic replace

use super::{PersistenceBackend, PersistenceConfig, PersistenceError};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// File-per-key backend rooted at `PersistenceConfig::data_dir`
pub struct FileBackend {
    config: PersistenceConfig,
}

impl FileBackend {
    /// Create a new file backend, creating the data directory if needed
    pub fn new(config: PersistenceConfig) -> Result<Self, PersistenceError> {
        std::fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Get the file path for a key
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.config.data_dir.join(key)
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.config
            .data_dir
            .join(format!(".{}.{}.tmp", key, std::process::id()))
    }

    fn sync_dir(&self) -> Result<(), PersistenceError> {
        // Directory fsync makes the rename durable; not supported on Windows.
        #[cfg(unix)]
        File::open(&self.config.data_dir)?.sync_all()?;
        Ok(())
    }
}

impl PersistenceBackend for FileBackend {
    fn write(&self, key: &str, data: &[u8]) -> Result<(), PersistenceError> {
        let path = self.key_path(key);
        let tmp = self.temp_path(key);

        let result = (|| {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp)?;
            file.write_all(data)?;
            if self.config.sync_writes {
                file.sync_all()?;
            }
            std::fs::rename(&tmp, &path)
        })();

        if let Err(e) = result {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        if self.config.sync_writes {
            self.sync_dir()?;
        }

        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        match std::fs::read(self.key_path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn append(&self, key: &str, record: &[u8]) -> Result<(), PersistenceError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.key_path(key))?;

        // One write call per record so a crash leaves at most one torn line.
        let mut line = Vec::with_capacity(record.len() + 1);
        line.extend_from_slice(record);
        line.push(b'\n');
        file.write_all(&line)?;

        if self.config.sync_writes {
            file.sync_data()?;
        }

        Ok(())
    }
}
