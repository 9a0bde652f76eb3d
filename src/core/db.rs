use anyhow::{Error, Result};
use rusqlite::Connection;

/// Open the SQLite database at `db_path`, creating it and its
/// schema if needed.
pub fn connect(db_path: &str) -> Result<Connection, Error> {
    let conn = Connection::open(db_path)?;
    initialize_db(&conn)?;
    tracing::debug!("Opened database at {}", db_path);
    Ok(conn)
}

pub fn initialize_db(conn: &Connection) -> Result<(), Error> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )?;
    Ok(())
}
