use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{CycleWindow, UserProfile};
use crate::prediction::CyclePolicy;

/// Text shown on the home screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardSummary {
    pub greeting: String,
    pub next_period: String,
    pub fertile_window: String,
    pub days_until: Option<i64>,
}

pub fn greeting(name: Option<&str>) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("Hello, {name}!"),
        None => "Hello, User!".to_string(),
    }
}

/// e.g. "Jan 10 - Jan 15"
pub fn window_label(window: &CycleWindow) -> String {
    format!(
        "{} - {}",
        window.start.format("%b %d"),
        window.end.format("%b %d")
    )
}

pub fn summarize(
    profile: Option<&UserProfile>,
    policy: &CyclePolicy,
    now: NaiveDateTime,
) -> DashboardSummary {
    let Some(profile) = profile else {
        return DashboardSummary {
            greeting: greeting(None),
            next_period: "No data found".to_string(),
            fertile_window: "Please complete setup".to_string(),
            days_until: None,
        };
    };

    let greeting = greeting(Some(&profile.name));
    if profile.last_period_date.trim().is_empty() || profile.cycle_length == 0 {
        return DashboardSummary {
            greeting,
            next_period: "Setup your profile to see predictions".to_string(),
            fertile_window: "No data available".to_string(),
            days_until: None,
        };
    }

    match profile
        .cycle_profile()
        .and_then(|cycle| policy.predict(&cycle, now))
    {
        Ok(prediction) => DashboardSummary {
            greeting,
            next_period: prediction.countdown.label.to_string(),
            fertile_window: window_label(&prediction.windows.fertile),
            days_until: Some(prediction.countdown.days_until),
        },
        Err(err) => {
            tracing::warn!(error = %err, "stored profile cannot be predicted from");
            DashboardSummary {
                greeting,
                next_period: "Error calculating dates".to_string(),
                fertile_window: "Error".to_string(),
                days_until: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now(s: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn profile(name: &str, date: &str) -> UserProfile {
        UserProfile {
            name: name.into(),
            age: 31,
            cycle_length: 28,
            last_period_date: date.into(),
        }
    }

    #[test]
    fn summary_for_complete_profile() {
        let p = profile("Ada", "2024-01-01");
        let s = summarize(Some(&p), &CyclePolicy::default(), now("2024-01-19"));
        assert_eq!(s.greeting, "Hello, Ada!");
        assert_eq!(s.next_period, "In 9 days");
        assert_eq!(s.days_until, Some(9));
        assert_eq!(s.fertile_window, "Jan 10 - Jan 15");
    }

    #[test]
    fn summary_without_profile() {
        let s = summarize(None, &CyclePolicy::default(), now("2024-01-19"));
        assert_eq!(s.greeting, "Hello, User!");
        assert_eq!(s.next_period, "No data found");
        assert_eq!(s.fertile_window, "Please complete setup");
    }

    #[test]
    fn summary_with_incomplete_profile() {
        let p = profile("  ", "");
        let s = summarize(Some(&p), &CyclePolicy::default(), now("2024-01-19"));
        assert_eq!(s.greeting, "Hello, User!");
        assert_eq!(s.next_period, "Setup your profile to see predictions");
        assert_eq!(s.fertile_window, "No data available");
    }

    #[test]
    fn summary_with_bad_date() {
        let p = profile("Ada", "2024/01/01");
        let s = summarize(Some(&p), &CyclePolicy::default(), now("2024-01-19"));
        assert_eq!(s.next_period, "Error calculating dates");
        assert_eq!(s.fertile_window, "Error");
        assert_eq!(s.days_until, None);
    }

    #[test]
    fn late_period() {
        let p = profile("Ada", "2024-01-01");
        let s = summarize(Some(&p), &CyclePolicy::default(), now("2024-02-05"));
        assert_eq!(s.next_period, "Period may be late");
    }

    #[test]
    fn summary_with_unrepresentable_cycle() {
        let p = UserProfile {
            cycle_length: u32::MAX,
            ..profile("Ada", "2024-01-01")
        };
        let s = summarize(Some(&p), &CyclePolicy::default(), now("2024-01-19"));
        assert_eq!(s.greeting, "Hello, Ada!");
        assert_eq!(s.next_period, "Error calculating dates");
        assert_eq!(s.days_until, None);
    }
}
