//! # Vegetation Source Module
//!
//! Loading of the precomputed vegetation-index table that backs the dashboard.
//! The table is read once at startup and never mutated afterwards; a missing,
//! unreadable or empty source is a fatal [`LabError::SourceUnavailable`].
//!
//! Expected CSV columns (extra columns are ignored):
//! `region_name`, `Week`, `Year`, `VCI`, `TCI`, `VHI`.

use crate::error::{LabError, Result};
use chrono::{Datelike, Duration, NaiveDate};
use log::info;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name prefix of the cleaned data produced by the download lab.
pub const SOURCE_PREFIX: &str = "cleaned_data_for_";

/// One row of the vegetation-index table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub region_name: String,
    #[serde(rename = "Week", deserialize_with = "whole_number")]
    pub week: i64,
    #[serde(rename = "Year", deserialize_with = "whole_number")]
    pub year: i64,
    /// Index cells left empty in the source read as NaN.
    #[serde(rename = "VCI", deserialize_with = "index_cell")]
    pub vci: f64,
    #[serde(rename = "TCI", deserialize_with = "index_cell")]
    pub tci: f64,
    #[serde(rename = "VHI", deserialize_with = "index_cell")]
    pub vhi: f64,
}

impl IndexRecord {
    pub fn index(&self, kind: IndexKind) -> f64 {
        match kind {
            IndexKind::Vci => self.vci,
            IndexKind::Tci => self.tci,
            IndexKind::Vhi => self.vhi,
        }
    }
}

/// Accepts `7` as well as `7.0`, which cleaned exports sometimes contain.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(serde::de::Error::custom(format!("{} is not a whole number", value)));
    }
    Ok(value as i64)
}

fn index_cell<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// The three condition indices available per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IndexKind {
    Vci,
    Tci,
    Vhi,
}

impl IndexKind {
    pub const ALL: [IndexKind; 3] = [IndexKind::Vci, IndexKind::Tci, IndexKind::Vhi];

    pub fn name(&self) -> &'static str {
        match self {
            IndexKind::Vci => "VCI",
            IndexKind::Tci => "TCI",
            IndexKind::Vhi => "VHI",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndexKind {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self> {
        IndexKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| LabError::invalid("index_kind", format!("unknown index '{}'", s)))
    }
}

/// The immutable vegetation-index table.
#[derive(Debug, Clone)]
pub struct VegetationTable {
    path: PathBuf,
    rows: Vec<IndexRecord>,
}

impl VegetationTable {
    /// Reads and parses the CSV at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| LabError::source_unavailable(path, e))?;
        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<IndexRecord>, _>>()
            .map_err(|e| LabError::source_unavailable(path, e))?;
        let table = Self::from_rows(path, rows)?;
        info!(
            "Loaded {} rows for {} regions from {}",
            table.rows.len(),
            table.regions().len(),
            path.display()
        );
        Ok(table)
    }

    /// Wraps already-parsed rows; an empty table is unavailable.
    pub fn from_rows(path: impl Into<PathBuf>, rows: Vec<IndexRecord>) -> Result<Self> {
        let path = path.into();
        if rows.is_empty() {
            return Err(LabError::source_unavailable(path, "table has no rows"));
        }
        Ok(Self { path, rows })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> &[IndexRecord] {
        &self.rows
    }

    /// Unique region names in order of first appearance.
    pub fn regions(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for row in &self.rows {
            if !seen.iter().any(|r| *r == row.region_name) {
                seen.push(row.region_name.clone());
            }
        }
        seen
    }

    pub fn week_bounds(&self) -> (i64, i64) {
        bounds(self.rows.iter().map(|r| r.week))
    }

    pub fn year_bounds(&self) -> (i64, i64) {
        bounds(self.rows.iter().map(|r| r.year))
    }
}

fn bounds(values: impl Iterator<Item = i64>) -> (i64, i64) {
    values.fold((i64::MAX, i64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Finds the cleaned-data CSV for `date` in `dir`
/// (`cleaned_data_for_{YYYY-MM-DD}_*.csv`). Several matches resolve to the
/// first in name order.
pub fn discover_source(dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    let prefix = format!("{}{}_", SOURCE_PREFIX, date.format("%Y-%m-%d"));
    let entries = fs::read_dir(dir).map_err(|e| LabError::source_unavailable(dir, e))?;
    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".csv"))
        })
        .collect();
    matches.sort();
    matches.into_iter().next().ok_or_else(|| {
        LabError::source_unavailable(dir, format!("no file matching {}*.csv", prefix))
    })
}

/// Monday of week `week` of `year`, with weeks starting on Monday and week 1
/// beginning on the first Monday of the year. Week 0 is the Monday on or
/// before 1 January.
pub fn week_start_date(year: i64, week: i64) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, 1, 1)?;
    let first_weekday = jan1.weekday().num_days_from_monday() as i64;
    let offset = if week == 0 {
        -first_weekday
    } else {
        (7 - first_weekday) % 7 + 7 * (week - 1)
    };
    jan1.checked_add_signed(Duration::days(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_start_dates() {
        // 2021-01-01 is a Friday: week 1 starts on Monday 4 January.
        assert_eq!(week_start_date(2021, 1), NaiveDate::from_ymd_opt(2021, 1, 4));
        assert_eq!(week_start_date(2021, 10), NaiveDate::from_ymd_opt(2021, 3, 8));
        assert_eq!(week_start_date(2021, 0), NaiveDate::from_ymd_opt(2020, 12, 28));
        // 2024-01-01 is a Monday: it starts week 1.
        assert_eq!(week_start_date(2024, 1), NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn test_index_kind_names_round_trip() {
        for kind in IndexKind::ALL {
            assert_eq!(kind.name().parse::<IndexKind>().unwrap(), kind);
        }
        assert!("NDVI".parse::<IndexKind>().is_err());
    }

    #[test]
    fn test_empty_index_cells_read_as_nan() {
        let data = "region_name,Week,Year,VCI,TCI,VHI\nKyiv,3,2021,,40.5,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<IndexRecord> = reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();
        assert!(rows[0].vci.is_nan());
        assert_eq!(rows[0].tci, 40.5);
        assert!(rows[0].index(IndexKind::Vhi).is_nan());
    }

    #[test]
    fn test_empty_rows_are_unavailable() {
        let err = VegetationTable::from_rows("mem", vec![]).unwrap_err();
        assert!(matches!(err, LabError::SourceUnavailable { .. }));
    }
}
