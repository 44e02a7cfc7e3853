use crate::Database;
use crate::models::{ComplaintPatch, ComplaintRow, NewComplaint};
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use hostel_types::models::DEFAULT_STATUS;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

const COMPLAINT_COLUMNS: &str = "id, student_name, room_number, category, description, priority, \
     status, admin_notes, created_at, updated_at";

impl Database {
    // -- Complaints --

    /// Insert a complaint, assigning its id, timestamps and default status.
    pub fn insert_complaint(&self, new: &NewComplaint) -> Result<ComplaintRow> {
        let now = timestamp();
        let row = ComplaintRow {
            id: Uuid::new_v4().to_string(),
            student_name: new.student_name.clone(),
            room_number: new.room_number.clone(),
            category: new.category.clone(),
            description: new.description.clone(),
            priority: new.priority.clone(),
            status: DEFAULT_STATUS.to_string(),
            admin_notes: String::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO complaints (id, student_name, room_number, category, description, priority,
                                         status, admin_notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    &row.id,
                    &row.student_name,
                    &row.room_number,
                    &row.category,
                    &row.description,
                    &row.priority,
                    &row.status,
                    &row.admin_notes,
                    &row.created_at,
                    &row.updated_at,
                ],
            )?;
            bump_revision(&tx)?;
            tx.commit()?;
            Ok(())
        })?;

        Ok(row)
    }

    /// Every complaint in insertion order.
    pub fn list_complaints(&self) -> Result<Vec<ComplaintRow>> {
        self.with_conn(query_complaints)
    }

    /// The full listing together with the revision it reflects, read under
    /// one lock so the pair is consistent.
    pub fn snapshot(&self) -> Result<(u64, Vec<ComplaintRow>)> {
        self.with_conn(|conn| Ok((query_revision(conn)?, query_complaints(conn)?)))
    }

    pub fn get_complaint(&self, id: &str) -> Result<Option<ComplaintRow>> {
        self.with_conn(|conn| query_complaint(conn, id))
    }

    /// Apply the fields present in `patch`. Returns `None` when no complaint
    /// has this id. An empty patch returns the record without touching it.
    pub fn update_complaint(&self, id: &str, patch: &ComplaintPatch) -> Result<Option<ComplaintRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let Some(mut row) = query_complaint(&tx, id)? else {
                return Ok(None);
            };
            if patch.is_empty() {
                return Ok(Some(row));
            }

            if let Some(status) = &patch.status {
                row.status = status.clone();
            }
            if let Some(notes) = &patch.admin_notes {
                row.admin_notes = notes.clone();
            }
            row.updated_at = timestamp();

            tx.execute(
                "UPDATE complaints SET status = ?1, admin_notes = ?2, updated_at = ?3 WHERE id = ?4",
                rusqlite::params![&row.status, &row.admin_notes, &row.updated_at, id],
            )?;
            bump_revision(&tx)?;
            tx.commit()?;

            Ok(Some(row))
        })
    }

    /// Physically remove a complaint. Returns false when the id is unknown.
    pub fn delete_complaint(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute("DELETE FROM complaints WHERE id = ?1", [id])?;
            if removed == 0 {
                return Ok(false);
            }
            bump_revision(&tx)?;
            tx.commit()?;
            Ok(true)
        })
    }

    // -- Revision --

    pub fn revision(&self) -> Result<u64> {
        self.with_conn(query_revision)
    }
}

fn query_complaints(conn: &Connection) -> Result<Vec<ComplaintRow>> {
    let sql = format!("SELECT {COMPLAINT_COLUMNS} FROM complaints ORDER BY rowid");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], map_complaint)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_revision(conn: &Connection) -> Result<u64> {
    let revision: i64 =
        conn.query_row("SELECT revision FROM store_meta WHERE id = 1", [], |row| row.get(0))?;
    Ok(revision as u64)
}

fn query_complaint(conn: &Connection, id: &str) -> Result<Option<ComplaintRow>> {
    let sql = format!("SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE id = ?1");
    let row = conn.query_row(&sql, [id], map_complaint).optional()?;
    Ok(row)
}

fn map_complaint(row: &Row<'_>) -> rusqlite::Result<ComplaintRow> {
    Ok(ComplaintRow {
        id: row.get(0)?,
        student_name: row.get(1)?,
        room_number: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        priority: row.get(5)?,
        status: row.get(6)?,
        admin_notes: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn bump_revision(conn: &Connection) -> Result<()> {
    conn.execute("UPDATE store_meta SET revision = revision + 1 WHERE id = 1", [])?;
    Ok(())
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
