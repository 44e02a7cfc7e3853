use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (complaints collection)");
        conn.execute_batch(
            "
            CREATE TABLE complaints (
                id            TEXT PRIMARY KEY,
                student_name  TEXT NOT NULL CHECK (length(trim(student_name)) > 0),
                room_number   TEXT NOT NULL CHECK (length(trim(room_number)) > 0),
                category      TEXT NOT NULL CHECK (length(trim(category)) > 0),
                description   TEXT NOT NULL CHECK (length(trim(description)) > 0),
                priority      TEXT NOT NULL CHECK (length(trim(priority)) > 0),
                status        TEXT NOT NULL DEFAULT 'Pending',
                admin_notes   TEXT NOT NULL DEFAULT '',
                created_at    TEXT NOT NULL,
                updated_at    TEXT NOT NULL
            );

            -- Single-row counter bumped by every applied mutation
            CREATE TABLE store_meta (
                id        INTEGER PRIMARY KEY CHECK (id = 1),
                revision  INTEGER NOT NULL
            );
            INSERT INTO store_meta (id, revision) VALUES (1, 0);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    Ok(())
}
