use std::fs;
use std::path::{Path, PathBuf};

use crate::crypto::{self, KdfParams};
use crate::models::{AppData, UserProfile};
use crate::symptoms::SymptomEntry;

const APP_DIR: &str = "cycle-tracker";
const DATA_FILE: &str = "data.ctrk";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("crypto error: {0}")]
    Crypto(#[from] crypto::CryptoError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("data directory not found")]
    NoDataDir,
}

/// Per-user profile records. `Ok(None)` means the user has no profile yet.
pub trait ProfileStore {
    fn fetch_profile(&self, uid: &str) -> Result<Option<UserProfile>, StorageError>;
    fn save_profile(&mut self, uid: &str, profile: UserProfile) -> Result<(), StorageError>;
}

/// Per-day symptom records keyed by date; saving a date twice replaces it.
pub trait SymptomLog {
    fn save_entry(&mut self, uid: &str, entry: SymptomEntry) -> Result<(), StorageError>;
    fn entries(&self, uid: &str) -> Result<Vec<SymptomEntry>, StorageError>;
}

impl ProfileStore for AppData {
    fn fetch_profile(&self, uid: &str) -> Result<Option<UserProfile>, StorageError> {
        Ok(self.profiles.get(uid).cloned())
    }

    fn save_profile(&mut self, uid: &str, profile: UserProfile) -> Result<(), StorageError> {
        self.profiles.insert(uid.to_string(), profile);
        Ok(())
    }
}

impl SymptomLog for AppData {
    fn save_entry(&mut self, uid: &str, entry: SymptomEntry) -> Result<(), StorageError> {
        self.symptoms
            .entry(uid.to_string())
            .or_default()
            .insert(entry.date, entry);
        Ok(())
    }

    fn entries(&self, uid: &str) -> Result<Vec<SymptomEntry>, StorageError> {
        Ok(self
            .symptoms
            .get(uid)
            .map(|days| days.values().cloned().collect())
            .unwrap_or_default())
    }
}

/// Location of the encrypted data file.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
    kdf: KdfParams,
}

impl Storage {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(DATA_FILE),
            kdf: KdfParams::default(),
        }
    }

    /// `<local data dir>/cycle-tracker/data.ctrk`
    pub fn default_location() -> Result<Self, StorageError> {
        let dir = dirs::data_local_dir().ok_or(StorageError::NoDataDir)?;
        Ok(Self::in_dir(dir.join(APP_DIR)))
    }

    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the app has been set up on this device.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn save(&self, passphrase: &str, data: &AppData) -> Result<(), StorageError> {
        let json = serde_json::to_vec(data)?;
        let sealed = crypto::seal(passphrase, &json, self.kdf)?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, sealed)?;
        tracing::debug!(path = %self.path.display(), "data file written");
        Ok(())
    }

    pub fn load(&self, passphrase: &str) -> Result<AppData, StorageError> {
        let sealed = fs::read(&self.path)?;
        let json = crypto::open(passphrase, &sealed)?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Delete all data permanently.
    pub fn wipe(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            tracing::info!(path = %self.path.display(), "data file removed");
        }
        Ok(())
    }
}
