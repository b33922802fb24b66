use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::info;

/// One logged user action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub action: String,
    pub created_at: String,
}

/// Initialize the action-log schema
pub fn init_database_schema(conn: &Connection) -> Result<()> {
    info!("Initializing database schema...");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS actions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            username TEXT NOT NULL,
            action TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create actions table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_actions_user_id ON actions (user_id)",
        [],
    )
    .context("Failed to create user index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Record a user action in the log
pub fn log_action(
    conn: &Connection,
    user_id: i64,
    username: Option<&str>,
    action: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO actions (user_id, username, action) VALUES (?1, ?2, ?3)",
        params![user_id, username.unwrap_or("no_username"), action],
    )
    .context("Failed to insert action")?;

    let action_id = conn.last_insert_rowid();
    info!(user_id, action_id, action, "User action logged");
    Ok(action_id)
}

/// Fetch the most recent actions, newest first
pub fn recent_actions(conn: &Connection, limit: usize) -> Result<Vec<ActionRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, user_id, username, action, created_at
             FROM actions ORDER BY id DESC LIMIT ?1",
        )
        .context("Failed to prepare recent actions statement")?;

    let records = stmt
        .query_map(params![limit as i64], |row| {
            Ok(ActionRecord {
                id: row.get(0)?,
                user_id: row.get(1)?,
                username: row.get(2)?,
                action: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .context("Failed to query recent actions")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to read action rows")?;

    Ok(records)
}

/// Total number of logged actions
pub fn count_actions(conn: &Connection) -> Result<i64> {
    let count = conn
        .query_row("SELECT COUNT(*) FROM actions", [], |row| row.get(0))
        .context("Failed to count actions")?;
    Ok(count)
}

/// Delete every logged action, returning how many were removed
pub fn clear_actions(conn: &Connection) -> Result<usize> {
    let removed = conn
        .execute("DELETE FROM actions", [])
        .context("Failed to clear actions")?;
    info!(removed, "Action log cleared");
    Ok(removed)
}
