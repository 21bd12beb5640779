//! Database layer: migrations, queries, and cursor management.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::errors::Result;
use crate::events::{EventRecord, RahatEvent};

const EVENT_COLUMNS: &str = "id, event_id, event_type, project_id, beneficiary, actor, amount, \
     token_kind, ledger, timestamp, contract_id, tx_hash, created_at";

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    init_pool_with(database_url, 5).await
}

/// Like [`init_pool`] with an explicit connection limit. In-memory databases
/// need a single connection, since each connection opens its own database.
pub async fn init_pool_with(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    // Create the file on first start.
    let url = if url.contains(":memory:") || url.contains("mode=") {
        url
    } else if url.contains('?') {
        format!("{url}&mode=rwc")
    } else {
        format!("{url}?mode=rwc")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger from the cursor row.
/// Returns `0` when no cursor has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger (and optionally a pagination cursor string).
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Read back the raw cursor string (used to resume pagination mid-ledger).
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events inside one transaction. Events whose
/// RPC `event_id` is already stored are ignored, so re-polling a range is
/// harmless. Returns the number of new rows.
pub async fn insert_events(pool: &SqlitePool, events: &[RahatEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_id, event_type, project_id, beneficiary, actor, amount, token_kind,
                 ledger, timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&ev.event_id)
        .bind(&ev.event_type)
        .bind(&ev.project_id)
        .bind(&ev.beneficiary)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(&ev.token_kind)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }
    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events, optionally restricted to one `event_type`, ordered by
/// ledger ascending.
pub async fn get_events(pool: &SqlitePool, event_type: Option<&str>) -> Result<Vec<EventRecord>> {
    let rows = match event_type {
        Some(event_type) => {
            sqlx::query_as::<_, EventRecord>(&format!(
                "SELECT {EVENT_COLUMNS} FROM events WHERE event_type = ?1 ORDER BY ledger ASC, id ASC"
            ))
            .bind(event_type)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, EventRecord>(&format!(
                "SELECT {EVENT_COLUMNS} FROM events ORDER BY ledger ASC, id ASC"
            ))
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

/// Fetch all events for a given project, ordered by ledger ascending.
pub async fn get_events_for_project(
    pool: &SqlitePool,
    project_id: &str,
) -> Result<Vec<EventRecord>> {
    events_where(pool, "project_id", project_id).await
}

/// Fetch the issuance and claim history of one beneficiary hash.
pub async fn get_events_for_beneficiary(
    pool: &SqlitePool,
    beneficiary: &str,
) -> Result<Vec<EventRecord>> {
    events_where(pool, "beneficiary", beneficiary).await
}

/// Fetch every event an address is the subject of.
pub async fn get_events_for_actor(pool: &SqlitePool, actor: &str) -> Result<Vec<EventRecord>> {
    events_where(pool, "actor", actor).await
}

/// `column` is always one of the fixed names above, never user input.
async fn events_where(pool: &SqlitePool, column: &str, value: &str) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE {column} = ?1 ORDER BY ledger ASC, id ASC"
    ))
    .bind(value)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
