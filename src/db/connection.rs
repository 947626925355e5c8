use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use crate::error::{QueryContext, Result};

/// Open the database at `path`, enable foreign keys, and make sure every
/// table exists. Dropping the returned connection releases it.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).query_context("open SQLite database")?;
    debug!(path = %path.display(), "opened records database");
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Fresh private in-memory store with the schema applied.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().query_context("open in-memory database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Run the lazy migrations on an already open connection. Foreign keys are a
/// per-connection setting in SQLite, so this also switches them on.
///
/// Grades cascade away with their student or subject. Subjects and students
/// reference their teacher and group with `RESTRICT`, so those parents cannot
/// be deleted while anything still points at them.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .query_context("enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS groups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE CHECK (length(name) BETWEEN 1 AND 50)
        )",
        [],
    )
    .query_context("create groups table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teachers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL CHECK (length(first_name) BETWEEN 1 AND 100),
            second_name TEXT NOT NULL CHECK (length(second_name) BETWEEN 1 AND 100),
            email TEXT NOT NULL UNIQUE CHECK (length(email) BETWEEN 1 AND 100),
            phone TEXT CHECK (phone IS NULL OR length(phone) <= 20)
        )",
        [],
    )
    .query_context("create teachers table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subjects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE CHECK (length(name) BETWEEN 1 AND 250),
            teacher_id INTEGER NOT NULL,
            FOREIGN KEY(teacher_id) REFERENCES teachers(id) ON DELETE RESTRICT
        )",
        [],
    )
    .query_context("create subjects table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL CHECK (length(first_name) BETWEEN 1 AND 100),
            last_name TEXT NOT NULL CHECK (length(last_name) BETWEEN 1 AND 100),
            email TEXT NOT NULL UNIQUE CHECK (length(email) BETWEEN 1 AND 100),
            phone TEXT CHECK (phone IS NULL OR length(phone) <= 20),
            group_id INTEGER NOT NULL,
            FOREIGN KEY(group_id) REFERENCES groups(id) ON DELETE RESTRICT
        )",
        [],
    )
    .query_context("create students table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS grades (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id INTEGER NOT NULL,
            subject_id INTEGER NOT NULL,
            grade REAL NOT NULL,
            date_received TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY(student_id) REFERENCES students(id) ON DELETE CASCADE,
            FOREIGN KEY(subject_id) REFERENCES subjects(id) ON DELETE CASCADE
        )",
        [],
    )
    .query_context("create grades table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_student ON grades(student_id)",
        [],
    )
    .query_context("create grades student index")?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_subject ON grades(subject_id)",
        [],
    )
    .query_context("create grades subject index")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let conn = open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('groups', 'teachers', 'subjects', 'students', 'grades')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 5);
    }

    #[test]
    fn foreign_keys_are_enabled() {
        let conn = open_in_memory().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.sqlite");

        {
            let conn = open(&path).unwrap();
            conn.execute("INSERT INTO groups (name) VALUES ('A-1')", [])
                .unwrap();
        }

        let conn = open(&path).unwrap();
        let name: String = conn
            .query_row("SELECT name FROM groups", [], |row| row.get(0))
            .unwrap();
        assert_eq!(name, "A-1");
    }

    #[test]
    fn garbage_file_is_a_connectivity_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.sqlite");
        fs::write(&path, "this is definitely not a sqlite file\n".repeat(64)).unwrap();

        let err = open(&path).unwrap_err();
        assert!(err.is_connectivity(), "unexpected error: {err:?}");
    }
}
