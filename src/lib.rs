//! Cycle predictions, calendar marking and an encrypted on-device symptom log.

pub mod calendar;
pub mod commands;
pub mod crypto;
pub mod dashboard;
pub mod models;
pub mod prediction;
pub mod storage;
pub mod symptoms;
pub mod validation;

pub use models::{Countdown, CountdownLabel, CycleProfile, CycleWindow, CycleWindows};
pub use prediction::{
    compute_cycle_windows, compute_next_period_countdown, CyclePolicy, PredictionError,
};
