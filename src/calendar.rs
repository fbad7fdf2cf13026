use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// One calendar entry; `end` is exclusive.
#[derive(Debug, Clone, Deserialize)]
pub struct HolidayEntry {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Read-only lookup of non-working days, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    category: String,
    dates: HashSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn from_entries(entries: &[HolidayEntry], category: &str) -> Self {
        let mut dates = HashSet::new();

        for entry in entries
            .iter()
            .filter(|e| e.categories.iter().any(|c| c == category))
        {
            if entry.end <= entry.start {
                dates.insert(entry.start);
                continue;
            }
            let mut day = entry.start;
            while day < entry.end {
                dates.insert(day);
                match day.succ_opt() {
                    Some(next) => day = next,
                    None => break,
                }
            }
        }

        Self {
            category: category.to_string(),
            dates,
        }
    }

    /// Loads every `*.json` file in `dir`. A missing directory leaves only weekends.
    pub fn load_dir(dir: impl AsRef<Path>, category: &str) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "Holiday calendar directory not found; only weekends are non-working");
            return Ok(Self::from_entries(&[], category));
        }

        let mut entries = Vec::new();
        let mut files = 0usize;
        for item in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
            let path = item?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let mut parsed: Vec<HolidayEntry> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", path.display()))?;
            entries.append(&mut parsed);
            files += 1;
        }

        let calendar = Self::from_entries(&entries, category);
        info!(
            files,
            category,
            holidays = calendar.dates.len(),
            "Holiday calendar loaded"
        );
        Ok(calendar)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn is_non_working(&self, date: NaiveDate) -> bool {
        is_weekend(date) || self.is_holiday(date)
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
