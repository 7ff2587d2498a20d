// 🗄️ Species Store
// rusqlite-backed persistence for the catalogue: schema setup, read
// snapshots for the UI, the single-update submission path, and CSV
// seeding with idempotent re-imports.

use crate::form::EditSpeciesForm;
use crate::species::{Kingdom, Species, SpeciesEditValues};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Structured store failure carrying a human-readable message; the UI
/// surfaces `to_string()` in its failure notification.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No species with id {0}")]
    NotFound(String),

    /// Constraint violation, e.g. a duplicate scientific name
    #[error("{0}")]
    Constraint(String),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS species (
            id TEXT PRIMARY KEY,
            scientific_name TEXT NOT NULL,
            common_name TEXT,
            kingdom TEXT NOT NULL,
            total_population INTEGER,
            description TEXT,
            author TEXT NOT NULL,
            idempotency_hash TEXT UNIQUE NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_species_scientific_name
         ON species(scientific_name)",
        [],
    )?;

    Ok(())
}

/// Hash over the natural key of an imported row. This is for
/// DEDUPLICATION of re-imports, not identity - identity is `id`.
fn idempotency_hash(species: &Species) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{}{}{}",
        species.scientific_name,
        species.kingdom.as_str(),
        species.author
    ));
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// READ SNAPSHOTS
// ============================================================================

fn species_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Species> {
    let kingdom_raw: String = row.get(3)?;
    let kingdom = Kingdom::parse(&kingdom_raw).ok_or(rusqlite::Error::InvalidQuery)?;

    Ok(Species {
        id: row.get(0)?,
        scientific_name: row.get(1)?,
        common_name: row.get(2)?,
        kingdom,
        total_population: row.get(4)?,
        description: row.get(5)?,
        author: row.get(6)?,
    })
}

const SPECIES_COLUMNS: &str =
    "id, scientific_name, common_name, kingdom, total_population, description, author";

pub fn list_species(conn: &Connection) -> Result<Vec<Species>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM species ORDER BY scientific_name",
        SPECIES_COLUMNS
    ))?;

    let species = stmt
        .query_map([], species_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(species)
}

pub fn get_species(conn: &Connection, id: &str) -> Result<Option<Species>, StoreError> {
    let species = conn
        .query_row(
            &format!("SELECT {} FROM species WHERE id = ?1", SPECIES_COLUMNS),
            params![id],
            species_from_row,
        )
        .optional()?;

    Ok(species)
}

pub fn count_species(conn: &Connection) -> Result<i64, StoreError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM species", [], |row| row.get(0))?;
    Ok(count)
}

// ============================================================================
// WRITES
// ============================================================================

/// Insert one record; Ok(false) means the store already held it (or a
/// record with the same scientific name).
pub fn insert_species(conn: &Connection, species: &Species) -> Result<bool, StoreError> {
    let hash = idempotency_hash(species);
    let created_at = Utc::now().to_rfc3339();

    let result = conn.execute(
        "INSERT INTO species (
            id, scientific_name, common_name, kingdom,
            total_population, description, author, idempotency_hash, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            species.id,
            species.scientific_name,
            species.common_name,
            species.kingdom.as_str(),
            species.total_population,
            species.description,
            species.author,
            hash,
            created_at,
        ],
    );

    match result {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Record Update Submission: exactly one UPDATE of the five editable
/// fields, keyed by id. Zero affected rows is NotFound; constraint
/// violations surface the store's message. No retry, no partial commit.
///
/// Authorization (editor identity == author) is enforced by the caller
/// that exposes the edit surface, not re-checked here.
pub fn update_species(
    conn: &Connection,
    id: &str,
    values: &SpeciesEditValues,
) -> Result<(), StoreError> {
    let result = conn.execute(
        "UPDATE species SET
            scientific_name = ?1,
            common_name = ?2,
            kingdom = ?3,
            total_population = ?4,
            description = ?5
         WHERE id = ?6",
        params![
            values.scientific_name,
            values.common_name,
            values.kingdom.as_str(),
            values.total_population,
            values.description,
            id,
        ],
    );

    match result {
        Ok(0) => Err(StoreError::NotFound(id.to_string())),
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, message)) if err.code == rusqlite::ErrorCode::ConstraintViolation => {
            Err(StoreError::Constraint(
                message.unwrap_or_else(|| err.to_string()),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// CSV SEEDING
// ============================================================================

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub inserted: usize,
    pub duplicates: usize,
    pub invalid: usize,
}

/// Seed the catalogue from a CSV with header columns scientific_name,
/// common_name, kingdom, total_population, description, author (order
/// independent, extra columns ignored). Rows failing validation are
/// skipped and counted; re-importing the same file inserts nothing new.
pub fn import_species(conn: &Connection, csv_path: &Path) -> Result<ImportSummary> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open species CSV: {}", csv_path.display()))?;

    let headers = reader.headers().context("Failed to read CSV header row")?.clone();
    let col = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .with_context(|| format!("CSV header row is missing a '{}' column", name))
    };

    let scientific_idx = col("scientific_name")?;
    let common_idx = col("common_name")?;
    let kingdom_idx = col("kingdom")?;
    let population_idx = col("total_population")?;
    let description_idx = col("description")?;
    let author_idx = col("author")?;

    let mut summary = ImportSummary::default();

    for (row_num, result) in reader.records().enumerate() {
        let line = row_num + 2;
        let record = result.with_context(|| format!("Failed to parse CSV line {}", line))?;
        let cell = |idx: usize| record.get(idx).unwrap_or("").to_string();

        let author = cell(author_idx).trim().to_string();
        if author.is_empty() {
            tracing::warn!(line, "skipped species row without an author");
            summary.invalid += 1;
            continue;
        }

        let form = EditSpeciesForm {
            scientific_name: cell(scientific_idx),
            common_name: cell(common_idx),
            kingdom: cell(kingdom_idx),
            total_population: cell(population_idx),
            description: cell(description_idx),
        };

        let values = match form.validate() {
            Ok(values) => values,
            Err(errors) => {
                tracing::warn!(line, errors = %errors.len(), "skipped invalid species row");
                summary.invalid += 1;
                continue;
            }
        };

        if insert_species(conn, &Species::from_values(values, author))? {
            summary.inserted += 1;
        } else {
            summary.duplicates += 1;
        }
    }

    println!("✓ Inserted: {} species", summary.inserted);
    println!("✓ Skipped duplicates: {}", summary.duplicates);
    if summary.invalid > 0 {
        println!("✓ Skipped invalid rows: {}", summary.invalid);
    }

    Ok(summary)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn open_store() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn lion(author: &str) -> Species {
        Species {
            id: uuid::Uuid::new_v4().to_string(),
            scientific_name: "Panthera leo".to_string(),
            common_name: Some("Lion".to_string()),
            kingdom: Kingdom::Animalia,
            total_population: Some(20_000),
            description: Some("Large cat.".to_string()),
            author: author.to_string(),
        }
    }

    fn edit_values(scientific_name: &str) -> SpeciesEditValues {
        SpeciesEditValues {
            scientific_name: scientific_name.to_string(),
            common_name: None,
            kingdom: Kingdom::Animalia,
            total_population: None,
            description: None,
        }
    }

    #[test]
    fn test_insert_and_read_back() {
        let conn = open_store();
        let species = lion("user-1");

        assert!(insert_species(&conn, &species).unwrap());

        let fetched = get_species(&conn, &species.id).unwrap().unwrap();
        assert_eq!(fetched.scientific_name, "Panthera leo");
        assert_eq!(fetched.common_name, Some("Lion".to_string()));
        assert_eq!(fetched.kingdom, Kingdom::Animalia);
        assert_eq!(fetched.total_population, Some(20_000));
        assert_eq!(fetched.author, "user-1");

        assert!(get_species(&conn, "missing-id").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_insert_is_skipped() {
        let conn = open_store();

        assert!(insert_species(&conn, &lion("user-1")).unwrap());
        // same natural key, fresh uuid: still a duplicate
        assert!(!insert_species(&conn, &lion("user-1")).unwrap());
        assert_eq!(count_species(&conn).unwrap(), 1);
    }

    #[test]
    fn test_update_replaces_editable_fields() {
        let conn = open_store();
        let species = lion("user-1");
        insert_species(&conn, &species).unwrap();

        let values = SpeciesEditValues {
            scientific_name: "Panthera leo leo".to_string(),
            common_name: Some("Northern lion".to_string()),
            kingdom: Kingdom::Animalia,
            total_population: None,
            description: Some("Subspecies.".to_string()),
        };
        update_species(&conn, &species.id, &values).unwrap();

        let fetched = get_species(&conn, &species.id).unwrap().unwrap();
        assert_eq!(fetched.scientific_name, "Panthera leo leo");
        assert_eq!(fetched.common_name, Some("Northern lion".to_string()));
        assert_eq!(fetched.total_population, None);
        // non-editable fields untouched
        assert_eq!(fetched.id, species.id);
        assert_eq!(fetched.author, "user-1");
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let conn = open_store();

        let err = update_species(&conn, "no-such-id", &edit_values("Panthera leo")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(err.to_string().contains("no-such-id"));
    }

    #[test]
    fn test_update_to_duplicate_name_surfaces_constraint_message() {
        let conn = open_store();
        let mut tiger = lion("user-1");
        tiger.scientific_name = "Panthera tigris".to_string();
        tiger.id = "tiger-id".to_string();

        insert_species(&conn, &lion("user-1")).unwrap();
        insert_species(&conn, &tiger).unwrap();

        let err = update_species(&conn, "tiger-id", &edit_values("Panthera leo")).unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert!(err.to_string().contains("UNIQUE"));
    }

    #[test]
    fn test_list_is_ordered_by_scientific_name() {
        let conn = open_store();
        let mut zebra = lion("user-1");
        zebra.scientific_name = "Equus quagga".to_string();
        zebra.id = "zebra-id".to_string();

        insert_species(&conn, &lion("user-1")).unwrap();
        insert_species(&conn, &zebra).unwrap();

        let names: Vec<String> = list_species(&conn)
            .unwrap()
            .into_iter()
            .map(|s| s.scientific_name)
            .collect();
        assert_eq!(names, vec!["Equus quagga", "Panthera leo"]);
    }

    #[test]
    fn test_import_twice_is_idempotent() {
        let conn = open_store();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "scientific_name,common_name,kingdom,total_population,description,author\n\
             Panthera leo,Lion,Animalia,20000,Large cat.,user-1\n\
             Equus quagga,Plains zebra,Animalia,,,user-1\n\
             Amanita muscaria,Fly agaric,Fungi,,Iconic toadstool.,user-2"
        )
        .unwrap();
        file.flush().unwrap();

        let first = import_species(&conn, file.path()).unwrap();
        assert_eq!(first.inserted, 3);
        assert_eq!(first.duplicates, 0);

        let second = import_species(&conn, file.path()).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.duplicates, 3);
        assert_eq!(count_species(&conn).unwrap(), 3);
    }

    #[test]
    fn test_import_skips_invalid_rows() {
        let conn = open_store();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "scientific_name,common_name,kingdom,total_population,description,author\n\
             Panthera leo,Lion,Animalia,20000,,user-1\n\
             ,Nameless,Animalia,,,user-1\n\
             Ursus arctos,Brown bear,Mineralia,,,user-1\n\
             Canis lupus,Wolf,Animalia,,,"
        )
        .unwrap();
        file.flush().unwrap();

        let summary = import_species(&conn, file.path()).unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.invalid, 3);
        assert_eq!(count_species(&conn).unwrap(), 1);
    }

    #[test]
    fn test_optional_fields_stored_as_null_roundtrip() {
        let conn = open_store();
        let species = Species {
            id: "sparse-id".to_string(),
            scientific_name: "Equus quagga".to_string(),
            common_name: None,
            kingdom: Kingdom::Animalia,
            total_population: None,
            description: None,
            author: "user-1".to_string(),
        };
        insert_species(&conn, &species).unwrap();

        let fetched = get_species(&conn, "sparse-id").unwrap().unwrap();
        assert_eq!(fetched.common_name, None);
        assert_eq!(fetched.total_population, None);
        assert_eq!(fetched.description, None);
    }
}
