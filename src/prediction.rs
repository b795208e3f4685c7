use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{
    Countdown, CountdownLabel, CycleProfile, CycleWindow, CycleWindows, Prediction, RangeWarning,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("malformed date {input:?}, expected YYYY-MM-DD")]
    MalformedDate { input: String },
    #[error("invalid date {input:?}: {source}")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("{from} shifted by {days} days is outside the supported calendar")]
    OutOfRange { from: NaiveDate, days: i64 },
}

/// `date + days`, failing instead of overflowing the calendar.
fn shift(date: NaiveDate, days: i64) -> Result<NaiveDate, PredictionError> {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    };
    shifted.ok_or(PredictionError::OutOfRange { from: date, days })
}

fn window(start: NaiveDate, len: u32) -> Result<CycleWindow, PredictionError> {
    CycleWindow::starting_at(start, len).ok_or(PredictionError::OutOfRange {
        from: start,
        days: i64::from(len),
    })
}

/// Parse a zero-padded `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate, PredictionError> {
    let bytes = input.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(PredictionError::MalformedDate {
            input: input.to_string(),
        });
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|source| PredictionError::InvalidDate {
        input: input.to_string(),
        source,
    })
}

/// Day counts the predictor works with. The defaults model a 5-day period,
/// ovulation 14 days before the next period and a fertile window of the
/// 5 days leading up to ovulation plus ovulation itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CyclePolicy {
    pub period_length_days: u32,
    pub luteal_phase_days: u32,
    pub fertile_lead_days: u32,
    pub min_cycle_length: u32,
    pub max_cycle_length: u32,
}

impl Default for CyclePolicy {
    fn default() -> Self {
        Self {
            period_length_days: 5,
            luteal_phase_days: 14,
            fertile_lead_days: 5,
            min_cycle_length: 20,
            max_cycle_length: 40,
        }
    }
}

impl CyclePolicy {
    pub fn windows(&self, profile: &CycleProfile) -> Result<CycleWindows, PredictionError> {
        let last = profile.last_period_date;
        let next_start = shift(last, i64::from(profile.cycle_length))?;
        let ovulation_day = shift(next_start, -i64::from(self.luteal_phase_days))?;
        let fertile_start = shift(ovulation_day, -i64::from(self.fertile_lead_days))?;

        Ok(CycleWindows {
            period: window(last, self.period_length_days)?,
            next_period: window(next_start, self.period_length_days)?,
            fertile: CycleWindow::new(fertile_start, ovulation_day),
            ovulation_day,
        })
    }

    /// Whole days from `now` until the next period starts, truncated toward zero.
    pub fn countdown(
        &self,
        profile: &CycleProfile,
        now: NaiveDateTime,
    ) -> Result<Countdown, PredictionError> {
        let next_start = shift(profile.last_period_date, i64::from(profile.cycle_length))?;
        let days_until = (next_start.and_time(NaiveTime::MIN) - now).num_days();
        let label = match days_until {
            n if n > 0 => CountdownLabel::InDays(n),
            0 => CountdownLabel::Today,
            _ => CountdownLabel::MaybeLate,
        };
        Ok(Countdown { days_until, label })
    }

    pub fn check_cycle_length(&self, cycle_length: u32) -> Option<RangeWarning> {
        if (self.min_cycle_length..=self.max_cycle_length).contains(&cycle_length) {
            None
        } else {
            Some(RangeWarning {
                cycle_length,
                min: self.min_cycle_length,
                max: self.max_cycle_length,
            })
        }
    }

    /// Windows, countdown and range check in one pass.
    pub fn predict(
        &self,
        profile: &CycleProfile,
        now: NaiveDateTime,
    ) -> Result<Prediction, PredictionError> {
        let range_warning = self.check_cycle_length(profile.cycle_length);
        if let Some(warning) = &range_warning {
            tracing::warn!(%warning, "predicting with implausible cycle length");
        }
        Ok(Prediction {
            windows: self.windows(profile)?,
            countdown: self.countdown(profile, now)?,
            range_warning,
        })
    }
}

/// Derive the cycle windows for a stored `YYYY-MM-DD` date with the default policy.
pub fn compute_cycle_windows(
    last_period_date: &str,
    cycle_length: u32,
) -> Result<CycleWindows, PredictionError> {
    let profile = CycleProfile {
        last_period_date: parse_date(last_period_date)?,
        cycle_length,
    };
    CyclePolicy::default().windows(&profile)
}

pub fn compute_next_period_countdown(
    last_period_date: &str,
    cycle_length: u32,
    now: NaiveDateTime,
) -> Result<Countdown, PredictionError> {
    let profile = CycleProfile {
        last_period_date: parse_date(last_period_date)?,
        cycle_length,
    };
    CyclePolicy::default().countdown(&profile, now)
}
