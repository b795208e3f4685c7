use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::CycleWindows;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DayMark {
    Period,
    Fertile,
    Ovulation,
    Today,
    None,
}

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkedDay {
    pub date: NaiveDate,
    pub mark: DayMark,
}

/// Every day of one month with its mark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub days: Vec<MarkedDay>,
}

/// Marks calendar days from a set of predicted windows.
#[derive(Debug, Clone, Copy)]
pub struct CycleCalendar {
    windows: CycleWindows,
    today: NaiveDate,
    show_fertility: bool,
}

impl CycleCalendar {
    pub fn new(windows: CycleWindows, today: NaiveDate) -> Self {
        Self {
            windows,
            today,
            show_fertility: true,
        }
    }

    /// Hide fertile and ovulation marks.
    pub fn with_fertility(mut self, show: bool) -> Self {
        self.show_fertility = show;
        self
    }

    /// Period wins over ovulation, which wins over the rest of the fertile window.
    pub fn mark(&self, date: NaiveDate) -> DayMark {
        let w = &self.windows;
        if w.period.contains(date) || w.next_period.contains(date) {
            DayMark::Period
        } else if self.show_fertility && date == w.ovulation_day {
            DayMark::Ovulation
        } else if self.show_fertility && w.fertile.contains(date) {
            DayMark::Fertile
        } else if date == self.today {
            DayMark::Today
        } else {
            DayMark::None
        }
    }

    pub fn month(&self, year: i32, month: u32) -> Result<MonthView, CalendarError> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(CalendarError::InvalidMonth { year, month })?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or(CalendarError::InvalidMonth { year, month })?;

        let days = first_day
            .iter_days()
            .take_while(|d| *d < next_first)
            .map(|date| MarkedDay {
                date,
                mark: self.mark(date),
            })
            .collect();

        Ok(MonthView { year, month, days })
    }

    /// Label shown when a day is tapped.
    pub fn describe(&self, date: NaiveDate) -> String {
        let day = date.format("%-d %b %Y");
        match self.mark(date) {
            DayMark::Period => format!("Period Day - {day}"),
            DayMark::Fertile => format!("Fertile Window - {day}"),
            DayMark::Ovulation => format!("Ovulation Day - {day}"),
            DayMark::Today | DayMark::None => format!("Selected: {day}"),
        }
    }
}

pub fn title(today: NaiveDate) -> String {
    format!("My Cycle Calendar\n{}", today.format("%d %b %Y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::compute_cycle_windows;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn calendar(today: &str) -> CycleCalendar {
        CycleCalendar::new(compute_cycle_windows("2024-01-01", 28).unwrap(), date(today))
    }

    #[test]
    fn marks_each_category() {
        let cal = calendar("2024-01-20");
        assert_eq!(cal.mark(date("2024-01-03")), DayMark::Period);
        assert_eq!(cal.mark(date("2024-01-31")), DayMark::Period);
        assert_eq!(cal.mark(date("2024-01-10")), DayMark::Fertile);
        assert_eq!(cal.mark(date("2024-01-15")), DayMark::Ovulation);
        assert_eq!(cal.mark(date("2024-01-20")), DayMark::Today);
        assert_eq!(cal.mark(date("2024-01-21")), DayMark::None);
    }

    #[test]
    fn period_outranks_today() {
        let cal = calendar("2024-01-02");
        assert_eq!(cal.mark(date("2024-01-02")), DayMark::Period);
    }

    #[test]
    fn fertility_can_be_hidden() {
        let cal = calendar("2024-01-20").with_fertility(false);
        assert_eq!(cal.mark(date("2024-01-15")), DayMark::None);
        assert_eq!(cal.mark(date("2024-01-12")), DayMark::None);
        assert_eq!(cal.mark(date("2024-01-01")), DayMark::Period);
    }

    #[test]
    fn month_covers_every_day() {
        let cal = calendar("2024-01-20");
        let feb = cal.month(2024, 2).unwrap();
        assert_eq!(feb.days.len(), 29);
        let period: Vec<u32> = feb
            .days
            .iter()
            .filter(|d| d.mark == DayMark::Period)
            .map(|d| chrono::Datelike::day(&d.date))
            .collect();
        assert_eq!(period, vec![1, 2]);

        assert_eq!(cal.month(2023, 12).unwrap().days.len(), 31);
        assert!(cal.month(2024, 13).is_err());
        assert!(cal.month(2024, 0).is_err());
    }

    #[test]
    fn period_outranks_fertile_in_short_cycles() {
        let windows = compute_cycle_windows("2024-01-01", 20).unwrap();
        let cal = CycleCalendar::new(windows, date("2024-02-01"));
        assert_eq!(cal.mark(date("2024-01-04")), DayMark::Period);
        assert_eq!(cal.describe(date("2024-01-04")), "Period Day - 4 Jan 2024");
        assert_eq!(cal.mark(date("2024-01-06")), DayMark::Fertile);
        assert_eq!(cal.describe(date("2024-01-07")), "Ovulation Day - 7 Jan 2024");
    }

    #[test]
    fn describes_tapped_days() {
        let cal = calendar("2024-01-20");
        assert_eq!(cal.describe(date("2024-01-05")), "Period Day - 5 Jan 2024");
        assert_eq!(cal.describe(date("2024-01-11")), "Fertile Window - 11 Jan 2024");
        assert_eq!(cal.describe(date("2024-01-15")), "Ovulation Day - 15 Jan 2024");
        assert_eq!(cal.describe(date("2024-01-20")), "Selected: 20 Jan 2024");
    }

    #[test]
    fn title_shows_today() {
        assert_eq!(title(date("2026-10-08")), "My Cycle Calendar\n08 Oct 2026");
    }
}
