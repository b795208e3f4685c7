use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::prediction::{self, CyclePolicy, PredictionError};
use crate::symptoms::SymptomEntry;

/// The two inputs every prediction is derived from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleProfile {
    pub last_period_date: NaiveDate,
    pub cycle_length: u32,
}

/// Closed, inclusive range of calendar days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CycleWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CycleWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Window of `len` consecutive days beginning at `start` (at least one day).
    /// `None` when the window would run past the last representable date.
    pub fn starting_at(start: NaiveDate, len: u32) -> Option<Self> {
        let end = start.checked_add_days(chrono::Days::new(u64::from(len.max(1)) - 1))?;
        Some(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn overlaps(&self, other: &CycleWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn len(&self) -> usize {
        ((self.end - self.start).num_days() + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Windows derived from one [`CycleProfile`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleWindows {
    pub period: CycleWindow,
    pub next_period: CycleWindow,
    pub fertile: CycleWindow,
    pub ovulation_day: NaiveDate,
}

impl CycleWindows {
    pub fn period_days(&self) -> BTreeSet<NaiveDate> {
        self.period.days().collect()
    }

    pub fn next_period_days(&self) -> BTreeSet<NaiveDate> {
        self.next_period.days().collect()
    }

    pub fn fertile_days(&self) -> BTreeSet<NaiveDate> {
        self.fertile.days().collect()
    }

    pub fn ovulation(&self) -> CycleWindow {
        CycleWindow::single(self.ovulation_day)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CountdownLabel {
    InDays(i64),
    Today,
    MaybeLate,
}

impl fmt::Display for CountdownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountdownLabel::InDays(n) => write!(f, "In {n} days"),
            CountdownLabel::Today => f.write_str("Today"),
            CountdownLabel::MaybeLate => f.write_str("Period may be late"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Countdown {
    pub days_until: i64,
    pub label: CountdownLabel,
}

/// Advisory only: the cycle length lies outside the plausible range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RangeWarning {
    pub cycle_length: u32,
    pub min: u32,
    pub max: u32,
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cycle length {} is outside the usual {}-{} day range",
            self.cycle_length, self.min, self.max
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prediction {
    pub windows: CycleWindows,
    pub countdown: Countdown,
    pub range_warning: Option<RangeWarning>,
}

/// Per-user profile record, with the field names the profile store uses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub cycle_length: u32,
    pub last_period_date: String,
}

impl UserProfile {
    pub fn cycle_profile(&self) -> Result<CycleProfile, PredictionError> {
        Ok(CycleProfile {
            last_period_date: prediction::parse_date(&self.last_period_date)?,
            cycle_length: self.cycle_length,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    #[serde(default = "default_show_fertility")]
    pub show_fertility: bool,
    #[serde(default)]
    pub policy: CyclePolicy,
}

fn default_show_fertility() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            show_fertility: default_show_fertility(),
            policy: CyclePolicy::default(),
        }
    }
}

/// Everything kept in the encrypted data file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    pub user_id: String,
    #[serde(default)]
    pub profiles: BTreeMap<String, UserProfile>,
    #[serde(default)]
    pub symptoms: BTreeMap<String, BTreeMap<NaiveDate, SymptomEntry>>,
    #[serde(default)]
    pub settings: AppSettings,
}

impl AppData {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn window_days_are_inclusive() {
        let w = CycleWindow::starting_at(date("2024-02-27"), 5).unwrap();
        let days: Vec<_> = w.days().collect();
        assert_eq!(days.len(), 5);
        assert_eq!(w.len(), 5);
        assert_eq!(days[2], date("2024-02-29"));
        assert_eq!(w.end, date("2024-03-02"));
        assert!(w.contains(date("2024-03-02")));
        assert!(!w.contains(date("2024-03-03")));
    }

    #[test]
    fn zero_length_window_still_covers_its_start() {
        let w = CycleWindow::starting_at(date("2024-01-01"), 0).unwrap();
        assert_eq!(w, CycleWindow::single(date("2024-01-01")));
    }

    #[test]
    fn window_past_last_date_is_none() {
        assert!(CycleWindow::starting_at(NaiveDate::MAX, 5).is_none());
        assert_eq!(
            CycleWindow::starting_at(NaiveDate::MAX, 1),
            Some(CycleWindow::single(NaiveDate::MAX))
        );
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = CycleWindow::new(date("2024-01-01"), date("2024-01-05"));
        let b = CycleWindow::new(date("2024-01-05"), date("2024-01-09"));
        let c = CycleWindow::new(date("2024-01-06"), date("2024-01-09"));
        assert!(a.overlaps(&b) && b.overlaps(&a));
        assert!(!a.overlaps(&c) && !c.overlaps(&a));
    }

    #[test]
    fn countdown_labels() {
        assert_eq!(CountdownLabel::InDays(9).to_string(), "In 9 days");
        assert_eq!(CountdownLabel::Today.to_string(), "Today");
        assert_eq!(CountdownLabel::MaybeLate.to_string(), "Period may be late");
    }

    #[test]
    fn profile_uses_store_field_names() {
        let profile = UserProfile {
            name: "Ada".into(),
            age: 30,
            cycle_length: 28,
            last_period_date: "2024-01-01".into(),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["cycleLength"], 28);
        assert_eq!(json["lastPeriodDate"], "2024-01-01");
        assert_eq!(
            profile.cycle_profile().unwrap().last_period_date,
            date("2024-01-01")
        );
    }

    #[test]
    fn settings_default_when_missing() {
        let settings: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, AppSettings::default());
        assert!(settings.show_fertility);
    }
}
