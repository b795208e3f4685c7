use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::calendar::{CalendarError, CycleCalendar, MonthView};
use crate::crypto::CryptoError;
use crate::dashboard::{self, DashboardSummary};
use crate::models::{AppData, AppSettings, Prediction, UserProfile};
use crate::prediction::{CyclePolicy, PredictionError};
use crate::storage::{ProfileStore, Storage, StorageError, SymptomLog};
use crate::symptoms::{self, Flow, HistoryCard, Mood, PhysicalSymptom, SymptomEntry};
use crate::validation::{self, ProfileInput, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("app is locked")]
    Locked,
    #[error("app is already set up")]
    AlreadySetUp,
    #[error("Complete your profile to see cycle predictions")]
    NoProfile,
    #[error("state lock poisoned")]
    Poisoned,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl<T> From<std::sync::PoisonError<T>> for CommandError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        CommandError::Poisoned
    }
}

/// Holds the passphrase and decrypted data while unlocked.
pub struct AppState {
    storage: Storage,
    passphrase: Mutex<Option<String>>,
    data: Mutex<Option<AppData>>,
}

impl AppState {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            passphrase: Mutex::new(None),
            data: Mutex::new(None),
        }
    }

    pub fn is_setup(&self) -> bool {
        self.storage.exists()
    }

    /// Create an empty data file for a fresh user id and unlock it.
    pub fn setup(&self, passphrase: String) -> Result<String, CommandError> {
        if self.storage.exists() {
            return Err(CommandError::AlreadySetUp);
        }
        let user_id = Uuid::new_v4().to_string();
        let data = AppData::for_user(user_id.clone());
        self.storage.save(&passphrase, &data)?;

        *self.passphrase.lock()? = Some(passphrase);
        *self.data.lock()? = Some(data);
        tracing::info!(%user_id, "data file created");
        Ok(user_id)
    }

    /// Returns `false` when the passphrase does not open the data file.
    pub fn unlock(&self, passphrase: String) -> Result<bool, CommandError> {
        match self.storage.load(&passphrase) {
            Ok(data) => {
                *self.passphrase.lock()? = Some(passphrase);
                *self.data.lock()? = Some(data);
                Ok(true)
            }
            Err(StorageError::Crypto(CryptoError::Decryption)) => {
                tracing::warn!("unlock rejected: wrong passphrase");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Zeroize the passphrase and drop data from memory.
    pub fn lock(&self) {
        if let Ok(mut pass) = self.passphrase.lock() {
            if let Some(p) = pass.as_mut() {
                p.zeroize();
            }
            *pass = None;
        }
        if let Ok(mut data) = self.data.lock() {
            *data = None;
        }
    }

    fn read<T>(
        &self,
        f: impl FnOnce(&AppData) -> Result<T, CommandError>,
    ) -> Result<T, CommandError> {
        let data = self.data.lock()?;
        f(data.as_ref().ok_or(CommandError::Locked)?)
    }

    /// Apply `f` to a copy of the unlocked data; the copy replaces the live
    /// data only once it has been written to disk.
    fn write<T>(
        &self,
        f: impl FnOnce(&mut AppData) -> Result<T, CommandError>,
    ) -> Result<T, CommandError> {
        let pass_lock = self.passphrase.lock()?;
        let mut data_lock = self.data.lock()?;
        let (Some(pass), Some(data)) = (pass_lock.as_ref(), data_lock.as_mut()) else {
            return Err(CommandError::Locked);
        };
        let mut draft = data.clone();
        let out = f(&mut draft)?;
        self.storage.save(pass, &draft)?;
        *data = draft;
        Ok(out)
    }

    pub fn save_profile(&self, input: &ProfileInput) -> Result<UserProfile, CommandError> {
        let profile = self.write(|data| {
            let profile = validation::validate_profile(input, &data.settings.policy)?;
            let uid = data.user_id.clone();
            data.save_profile(&uid, profile.clone())?;
            Ok(profile)
        })?;
        tracing::info!(cycle_length = profile.cycle_length, "profile saved");
        Ok(profile)
    }

    pub fn get_profile(&self) -> Result<Option<UserProfile>, CommandError> {
        self.read(|data| Ok(data.fetch_profile(&data.user_id)?))
    }

    pub fn dashboard(&self, now: NaiveDateTime) -> Result<DashboardSummary, CommandError> {
        self.read(|data| {
            let profile = data.fetch_profile(&data.user_id)?;
            Ok(dashboard::summarize(
                profile.as_ref(),
                &data.settings.policy,
                now,
            ))
        })
    }

    pub fn predict(&self, now: NaiveDateTime) -> Result<Prediction, CommandError> {
        self.read(|data| {
            let profile = data
                .fetch_profile(&data.user_id)?
                .ok_or(CommandError::NoProfile)?;
            Ok(data.settings.policy.predict(&profile.cycle_profile()?, now)?)
        })
    }

    fn calendar(&self, today: NaiveDate) -> Result<CycleCalendar, CommandError> {
        self.read(|data| {
            let profile = data
                .fetch_profile(&data.user_id)?
                .ok_or(CommandError::NoProfile)?;
            let windows = data.settings.policy.windows(&profile.cycle_profile()?)?;
            Ok(CycleCalendar::new(windows, today).with_fertility(data.settings.show_fertility))
        })
    }

    pub fn calendar_month(
        &self,
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> Result<MonthView, CommandError> {
        Ok(self.calendar(today)?.month(year, month)?)
    }

    pub fn describe_day(&self, date: NaiveDate, today: NaiveDate) -> Result<String, CommandError> {
        Ok(self.calendar(today)?.describe(date))
    }

    pub fn log_symptoms(
        &self,
        now: NaiveDateTime,
        mood: Mood,
        flow: Flow,
        physical_symptoms: &[PhysicalSymptom],
        notes: &str,
    ) -> Result<SymptomEntry, CommandError> {
        let entry = SymptomEntry::record(now, mood, flow, physical_symptoms, notes);
        self.write(|data| {
            let uid = data.user_id.clone();
            Ok(data.save_entry(&uid, entry.clone())?)
        })?;
        tracing::info!(date = %entry.date, "symptoms saved");
        Ok(entry)
    }

    pub fn history(&self) -> Result<Vec<HistoryCard>, CommandError> {
        self.read(|data| {
            let entries = data.entries(&data.user_id)?;
            Ok(symptoms::history(&entries))
        })
    }

    pub fn get_settings(&self) -> Result<AppSettings, CommandError> {
        self.read(|data| Ok(data.settings.clone()))
    }

    pub fn toggle_fertility(&self, enabled: bool) -> Result<(), CommandError> {
        self.write(|data| {
            data.settings.show_fertility = enabled;
            Ok(())
        })
    }

    pub fn update_policy(&self, policy: CyclePolicy) -> Result<(), CommandError> {
        self.write(|data| {
            data.settings.policy = policy;
            Ok(())
        })
    }

    pub fn export_data(&self) -> Result<String, CommandError> {
        self.read(|data| Ok(serde_json::to_string_pretty(data)?))
    }

    pub fn wipe_all_data(&self) -> Result<(), CommandError> {
        self.lock();
        Ok(self.storage.wipe()?)
    }
}
