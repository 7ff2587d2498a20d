// 📊 Speed Ranking Ingestion
// Reads a tabular animal-speeds resource, normalizes rows into typed
// records, and ranks them for the chart page.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Ranked list length cap: the chart shows at most this many animals.
pub const MAX_RANKED: usize = 15;

// ============================================================================
// DIET
// ============================================================================

/// Diet - closed three-value enumeration
///
/// The chart's color mapping and legend are keyed on this, so membership is
/// checked here once and never again downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Diet {
    Carnivore,
    Herbivore,
    Omnivore,
}

impl Diet {
    /// All diets, in legend order
    pub const ALL: [Diet; 3] = [Diet::Carnivore, Diet::Herbivore, Diet::Omnivore];

    /// Normalized form, as it appears in the source data
    pub fn as_str(&self) -> &'static str {
        match self {
            Diet::Carnivore => "carnivore",
            Diet::Herbivore => "herbivore",
            Diet::Omnivore => "omnivore",
        }
    }

    /// Capitalized form for the legend
    pub fn label(&self) -> &'static str {
        match self {
            Diet::Carnivore => "Carnivore",
            Diet::Herbivore => "Herbivore",
            Diet::Omnivore => "Omnivore",
        }
    }

    /// Parse a raw diet cell: trimmed and lower-cased before matching.
    pub fn parse(raw: &str) -> Option<Diet> {
        match raw.trim().to_lowercase().as_str() {
            "carnivore" => Some(Diet::Carnivore),
            "herbivore" => Some(Diet::Herbivore),
            "omnivore" => Some(Diet::Omnivore),
            _ => None,
        }
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// One accepted row of the speeds resource.
///
/// Invariant: name is non-empty (post-trim), speed is finite and
/// non-negative, diet is a member of the three-value set. Rows failing any
/// of these never become records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalRecord {
    pub name: String,
    /// Speed in km/h
    pub speed: f64,
    pub diet: Diet,
}

/// Why a row was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyName,
    BadSpeed,
    UnknownDiet,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::EmptyName => "empty name",
            RejectReason::BadSpeed => "speed not a finite non-negative number",
            RejectReason::UnknownDiet => "diet outside carnivore/herbivore/omnivore",
        }
    }
}

/// A dropped row, with its 1-based line number in the source file.
#[derive(Debug, Clone)]
pub struct RowRejection {
    pub line: usize,
    pub reason: RejectReason,
}

/// The ranked result plus the rejection diagnostic.
///
/// Default callers read only `records`; `rejections` exists so data quality
/// problems are observable without changing the silent-drop behavior.
#[derive(Debug, Default)]
pub struct SpeedRanking {
    /// Sorted by speed descending (stable on ties), at most MAX_RANKED long
    pub records: Vec<AnimalRecord>,
    pub rejections: Vec<RowRejection>,
}

// ============================================================================
// LOADING
// ============================================================================

/// Load and rank the speeds resource.
///
/// The header row must contain `name`, `speed` and `diet` columns, in any
/// order; extra columns are ignored. A row is accepted atomically or
/// dropped entirely. Fetch/parse failures return Err - callers log and
/// proceed with an empty ranking rather than surfacing an error dialog.
pub fn load_speed_ranking(path: &Path) -> Result<SpeedRanking> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open speeds resource: {}", path.display()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers().context("Failed to read CSV header row")?.clone();
    let name_idx = column_index(&headers, "name")?;
    let speed_idx = column_index(&headers, "speed")?;
    let diet_idx = column_index(&headers, "diet")?;

    let mut records = Vec::new();
    let mut rejections = Vec::new();

    for (row_num, result) in reader.records().enumerate() {
        let line = row_num + 2; // 1-indexed + header row
        let record = result
            .with_context(|| format!("Failed to parse CSV line {} in {}", line, path.display()))?;

        let name = record.get(name_idx).unwrap_or("").trim();
        if name.is_empty() {
            reject(&mut rejections, line, RejectReason::EmptyName);
            continue;
        }

        let speed = match record.get(speed_idx).unwrap_or("").trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => v,
            _ => {
                reject(&mut rejections, line, RejectReason::BadSpeed);
                continue;
            }
        };

        let diet = match Diet::parse(record.get(diet_idx).unwrap_or("")) {
            Some(d) => d,
            None => {
                reject(&mut rejections, line, RejectReason::UnknownDiet);
                continue;
            }
        };

        records.push(AnimalRecord {
            name: name.to_string(),
            speed,
            diet,
        });
    }

    // Stable sort: ties keep source order
    records.sort_by(|a, b| b.speed.total_cmp(&a.speed));
    records.truncate(MAX_RANKED);

    if !rejections.is_empty() {
        tracing::warn!(
            dropped = rejections.len(),
            resource = %path.display(),
            "dropped rows while loading speed ranking"
        );
    }

    Ok(SpeedRanking { records, rejections })
}

/// Convenience wrapper for callers that only want the ranked list.
pub fn load_ranked_animals(path: &Path) -> Result<Vec<AnimalRecord>> {
    load_speed_ranking(path).map(|ranking| ranking.records)
}

fn column_index(headers: &csv::StringRecord, wanted: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == wanted)
        .with_context(|| format!("CSV header row is missing a '{}' column", wanted))
}

fn reject(rejections: &mut Vec<RowRejection>, line: usize, reason: RejectReason) {
    tracing::debug!(line, reason = reason.as_str(), "dropped row");
    rejections.push(RowRejection { line, reason });
}

// ============================================================================
// TESTS
// ============================================================================
