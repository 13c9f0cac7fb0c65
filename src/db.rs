use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::validation::{parse_input_number, ValidationError};
use crate::words;

/// A stored conversion.
///
/// Both fields are fixed at creation: `output_words` is derived from
/// `input_number` exactly once and never recomputed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Conversion {
    /// Stable identity (UUID)
    pub id: String,
    pub input_number: i64,
    pub output_words: String,
    pub created_at: DateTime<Utc>,
}

impl Conversion {
    /// Build a new record, deriving the words from the number
    pub fn new(input_number: i64) -> Result<Self> {
        let output_words = words::convert(input_number)
            .with_context(|| format!("Failed to convert {} to words", input_number))?;

        Ok(Conversion {
            id: uuid::Uuid::new_v4().to_string(),
            input_number,
            output_words,
            // stored with microsecond precision
            created_at: Utc::now().trunc_subsecs(6),
        })
    }
}

impl std::fmt::Display for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.input_number, self.output_words)
    }
}

/// Event for audit trail
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

pub const ENTITY_CONVERSION: &str = "conversion";

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for crash recovery; in-memory databases report "memory" instead
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Conversions Table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS conversions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            conversion_uuid TEXT UNIQUE NOT NULL,
            input_number INTEGER NOT NULL,
            output_words TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Events Table (audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_conversions_created_at ON conversions(created_at)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    Ok(())
}

/// Convert `input_number`, store the record and log a `conversion_created` event.
///
/// Record and event are committed together or not at all.
pub fn create_conversion(conn: &Connection, input_number: i64, actor: &str) -> Result<Conversion> {
    let tx = conn.unchecked_transaction()?;
    let conversion = store_conversion(&tx, input_number, actor)?;
    tx.commit()?;

    info!(id = %conversion.id, "created conversion {}", conversion);
    Ok(conversion)
}

// Caller owns the transaction
fn store_conversion(conn: &Connection, input_number: i64, actor: &str) -> Result<Conversion> {
    let conversion = Conversion::new(input_number)?;

    conn.execute(
        "INSERT INTO conversions (conversion_uuid, input_number, output_words, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            conversion.id,
            conversion.input_number,
            conversion.output_words,
            conversion.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        ],
    )
    .context("Failed to insert conversion")?;

    let event = Event::new(
        "conversion_created",
        ENTITY_CONVERSION,
        &conversion.id,
        serde_json::json!({
            "input_number": conversion.input_number,
            "output_words": conversion.output_words,
        }),
        actor,
    );
    insert_event(conn, &event)?;

    Ok(conversion)
}

fn conversion_from_row(row: &Row<'_>) -> rusqlite::Result<Conversion> {
    let created_at_str: String = row.get(3)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(Conversion {
        id: row.get(0)?,
        input_number: row.get(1)?,
        output_words: row.get(2)?,
        created_at,
    })
}

pub fn get_all_conversions(conn: &Connection) -> Result<Vec<Conversion>> {
    let mut stmt = conn.prepare(
        "SELECT conversion_uuid, input_number, output_words, created_at
         FROM conversions
         ORDER BY created_at ASC, id ASC",
    )?;

    let conversions = stmt
        .query_map([], conversion_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(conversions)
}

pub fn get_conversion(conn: &Connection, id: &str) -> Result<Option<Conversion>> {
    let conversion = conn
        .query_row(
            "SELECT conversion_uuid, input_number, output_words, created_at
             FROM conversions
             WHERE conversion_uuid = ?1",
            [id],
            conversion_from_row,
        )
        .optional()?;

    Ok(conversion)
}

/// Delete a conversion. Returns `false` when no record had that id.
pub fn delete_conversion(conn: &Connection, id: &str, actor: &str) -> Result<bool> {
    let tx = conn.unchecked_transaction()?;
    let removed = tx.execute("DELETE FROM conversions WHERE conversion_uuid = ?1", [id])?;

    if removed == 0 {
        return Ok(false);
    }

    let event = Event::new(
        "conversion_deleted",
        ENTITY_CONVERSION,
        id,
        serde_json::json!({}),
        actor,
    );
    insert_event(&tx, &event)?;
    tx.commit()?;

    info!(id, "deleted conversion");
    Ok(true)
}

pub fn count_conversions(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM conversions", [], |row| row.get(0))?;

    Ok(count)
}

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

/// Get events for a specific entity, oldest first
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp ASC, id ASC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], |row| {
            let timestamp_str: String = row.get(1)?;
            let data_json: String = row.get(5)?;

            Ok(Event {
                event_id: row.get(0)?,
                timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            1,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?
                    .with_timezone(&Utc),
                event_type: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                data: serde_json::from_str(&data_json).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        5,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
                actor: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

// ============================================================================
// CSV IMPORT
// ============================================================================

/// One CSV row. Kept as text so bad cells are reported, not fatal.
#[derive(Debug, Deserialize, Clone)]
pub struct ImportRow {
    pub input_number: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportSummary {
    pub inserted: usize,
    /// (1-based data row, reason)
    pub rejected: Vec<(usize, ValidationError)>,
}

pub fn load_csv(csv_path: &Path) -> Result<Vec<ImportRow>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open CSV file")?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: ImportRow = result.context("Failed to deserialize CSV row")?;
        rows.push(row);
    }

    Ok(rows)
}

/// Create a conversion per valid row; invalid rows are skipped and reported.
///
/// Runs as one transaction: a storage error leaves nothing imported.
pub fn import_numbers(conn: &Connection, rows: &[ImportRow]) -> Result<ImportSummary> {
    let tx = conn.unchecked_transaction()?;
    let mut summary = ImportSummary::default();

    for (index, row) in rows.iter().enumerate() {
        match parse_input_number(&row.input_number) {
            Ok(n) => {
                store_conversion(&tx, n, "csv_importer")
                    .with_context(|| format!("Import aborted at row {}", index + 1))?;
                summary.inserted += 1;
            }
            Err(e) => {
                warn!(row = index + 1, value = %row.input_number, "skipping row: {}", e);
                summary.rejected.push((index + 1, e));
            }
        }
    }

    tx.commit()?;
    info!(inserted = summary.inserted, rejected = summary.rejected.len(), "import finished");
    Ok(summary)
}
