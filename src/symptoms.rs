use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const EMPTY_HISTORY_MESSAGE: &str = "No symptom history yet.\nStart logging your symptoms!";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Mood {
    Happy,
    Sad,
    Anxious,
    Tired,
    Irritable,
    #[default]
    #[serde(rename = "Not specified")]
    NotSpecified,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Flow {
    Light,
    Moderate,
    Heavy,
    #[default]
    #[serde(rename = "Not specified")]
    NotSpecified,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PhysicalSymptom {
    Cramps,
    Headache,
    Bloating,
    Acne,
    #[serde(rename = "Back Pain")]
    BackPain,
    #[serde(rename = "Breast Tenderness")]
    BreastTenderness,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Anxious => "Anxious",
            Mood::Tired => "Tired",
            Mood::Irritable => "Irritable",
            Mood::NotSpecified => "Not specified",
        })
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Flow::Light => "Light",
            Flow::Moderate => "Moderate",
            Flow::Heavy => "Heavy",
            Flow::NotSpecified => "Not specified",
        })
    }
}

impl fmt::Display for PhysicalSymptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PhysicalSymptom::Cramps => "Cramps",
            PhysicalSymptom::Headache => "Headache",
            PhysicalSymptom::Bloating => "Bloating",
            PhysicalSymptom::Acne => "Acne",
            PhysicalSymptom::BackPain => "Back Pain",
            PhysicalSymptom::BreastTenderness => "Breast Tenderness",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} {input:?}")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub input: String,
}

fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

impl FromStr for Mood {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "happy" => Ok(Mood::Happy),
            "sad" => Ok(Mood::Sad),
            "anxious" => Ok(Mood::Anxious),
            "tired" => Ok(Mood::Tired),
            "irritable" => Ok(Mood::Irritable),
            "" | "notspecified" => Ok(Mood::NotSpecified),
            _ => Err(UnknownTag {
                kind: "mood",
                input: s.to_string(),
            }),
        }
    }
}

impl FromStr for Flow {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "light" => Ok(Flow::Light),
            "moderate" => Ok(Flow::Moderate),
            "heavy" => Ok(Flow::Heavy),
            "" | "notspecified" => Ok(Flow::NotSpecified),
            _ => Err(UnknownTag {
                kind: "flow",
                input: s.to_string(),
            }),
        }
    }
}

impl FromStr for PhysicalSymptom {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "cramps" => Ok(PhysicalSymptom::Cramps),
            "headache" => Ok(PhysicalSymptom::Headache),
            "bloating" => Ok(PhysicalSymptom::Bloating),
            "acne" => Ok(PhysicalSymptom::Acne),
            "backpain" => Ok(PhysicalSymptom::BackPain),
            "breasttenderness" => Ok(PhysicalSymptom::BreastTenderness),
            _ => Err(UnknownTag {
                kind: "symptom",
                input: s.to_string(),
            }),
        }
    }
}

/// One day's log, stored under its `date` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SymptomEntry {
    pub date: NaiveDate,
    pub timestamp: String,
    #[serde(default)]
    pub mood: Mood,
    #[serde(default)]
    pub flow: Flow,
    #[serde(default)]
    pub physical_symptoms: Vec<PhysicalSymptom>,
    #[serde(default)]
    pub notes: String,
}

impl SymptomEntry {
    /// Build the entry for the calendar day of `now`.
    pub fn record(
        now: NaiveDateTime,
        mood: Mood,
        flow: Flow,
        physical_symptoms: &[PhysicalSymptom],
        notes: &str,
    ) -> Self {
        let mut tags: Vec<PhysicalSymptom> = Vec::with_capacity(physical_symptoms.len());
        for symptom in physical_symptoms {
            if !tags.contains(symptom) {
                tags.push(*symptom);
            }
        }

        Self {
            date: now.date(),
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            mood,
            flow,
            physical_symptoms: tags,
            notes: notes.trim().to_string(),
        }
    }
}

/// Display form of a logged day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryCard {
    pub date: String,
    pub lines: Vec<String>,
}

impl HistoryCard {
    pub fn from_entry(entry: &SymptomEntry) -> Self {
        let mut lines = Vec::new();
        if entry.mood != Mood::NotSpecified {
            lines.push(format!("Mood: {}", entry.mood));
        }
        if entry.flow != Flow::NotSpecified {
            lines.push(format!("Flow: {}", entry.flow));
        }
        if !entry.physical_symptoms.is_empty() {
            let tags: Vec<String> = entry
                .physical_symptoms
                .iter()
                .map(ToString::to_string)
                .collect();
            lines.push(format!("Symptoms: {}", tags.join(", ")));
        }
        if !entry.notes.is_empty() {
            lines.push(format!("Notes: {}", entry.notes));
        }

        Self {
            date: entry.date.to_string(),
            lines,
        }
    }
}

/// Logged days, newest first.
pub fn history<'a>(entries: impl IntoIterator<Item = &'a SymptomEntry>) -> Vec<HistoryCard> {
    let mut sorted: Vec<&SymptomEntry> = entries.into_iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.into_iter().map(HistoryCard::from_entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn record_keys_by_calendar_day() {
        let entry = SymptomEntry::record(
            at("2024-03-04 21:15:09"),
            Mood::Tired,
            Flow::Heavy,
            &[
                PhysicalSymptom::Cramps,
                PhysicalSymptom::BackPain,
                PhysicalSymptom::Cramps,
            ],
            "  long day  ",
        );
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(entry.timestamp, "2024-03-04 21:15:09");
        assert_eq!(
            entry.physical_symptoms,
            vec![PhysicalSymptom::Cramps, PhysicalSymptom::BackPain]
        );
        assert_eq!(entry.notes, "long day");
    }

    #[test]
    fn serializes_with_display_strings() {
        let entry = SymptomEntry::record(
            at("2024-03-04 08:00:00"),
            Mood::NotSpecified,
            Flow::Light,
            &[PhysicalSymptom::BreastTenderness],
            "",
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "2024-03-04");
        assert_eq!(json["mood"], "Not specified");
        assert_eq!(json["flow"], "Light");
        assert_eq!(json["physicalSymptoms"][0], "Breast Tenderness");
    }

    #[test]
    fn card_skips_unspecified_fields() {
        let entry = SymptomEntry::record(
            at("2024-03-04 08:00:00"),
            Mood::NotSpecified,
            Flow::NotSpecified,
            &[],
            "",
        );
        let card = HistoryCard::from_entry(&entry);
        assert_eq!(card.date, "2024-03-04");
        assert!(card.lines.is_empty());
    }

    #[test]
    fn card_lists_every_logged_field() {
        let entry = SymptomEntry::record(
            at("2024-03-04 08:00:00"),
            Mood::Anxious,
            Flow::Moderate,
            &[PhysicalSymptom::Headache, PhysicalSymptom::Acne],
            "slept badly",
        );
        assert_eq!(
            HistoryCard::from_entry(&entry).lines,
            vec![
                "Mood: Anxious",
                "Flow: Moderate",
                "Symptoms: Headache, Acne",
                "Notes: slept badly",
            ]
        );
    }

    #[test]
    fn parses_tags_loosely() {
        assert_eq!(
            "back-pain".parse::<PhysicalSymptom>().unwrap(),
            PhysicalSymptom::BackPain
        );
        assert_eq!(
            "Breast Tenderness".parse::<PhysicalSymptom>().unwrap(),
            PhysicalSymptom::BreastTenderness
        );
        assert_eq!("HAPPY".parse::<Mood>().unwrap(), Mood::Happy);
        assert_eq!("Not specified".parse::<Flow>().unwrap(), Flow::NotSpecified);
        assert!("spotting".parse::<Flow>().is_err());
    }

    #[test]
    fn history_is_newest_first() {
        let entries = [
            SymptomEntry::record(at("2024-03-02 08:00:00"), Mood::Happy, Flow::Light, &[], ""),
            SymptomEntry::record(at("2024-03-09 08:00:00"), Mood::Sad, Flow::Light, &[], ""),
            SymptomEntry::record(at("2024-02-28 08:00:00"), Mood::Tired, Flow::Light, &[], ""),
        ];
        let dates: Vec<String> = history(&entries).into_iter().map(|c| c.date).collect();
        assert_eq!(dates, vec!["2024-03-09", "2024-03-02", "2024-02-28"]);
    }
}
