use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{QueryContext, RecordsError, Result};
use crate::models::{Grade, Subject, Teacher};

use super::grades::grade_from_row;
use super::teachers::teacher_from_row;

pub(crate) fn subject_from_row(row: &Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        name: row.get(1)?,
        teacher_id: row.get(2)?,
    })
}

/// Insert a subject taught by `teacher_id`. A teacher id that does not exist
/// is rejected by the foreign key.
pub fn create_subject(conn: &Connection, name: &str, teacher_id: i64) -> Result<Subject> {
    conn.execute(
        "INSERT INTO subjects (name, teacher_id) VALUES (?1, ?2)",
        params![name, teacher_id],
    )
    .query_context("insert subject")?;

    let id = conn.last_insert_rowid();
    debug!(id, name, teacher_id, "created subject");
    Ok(Subject {
        id,
        name: name.to_string(),
        teacher_id,
    })
}

pub fn fetch_subject(conn: &Connection, id: i64) -> Result<Option<Subject>> {
    conn.query_row(
        "SELECT id, name, teacher_id FROM subjects WHERE id = ?1",
        params![id],
        subject_from_row,
    )
    .optional()
    .query_context("load subject")
}

pub fn fetch_subjects(conn: &Connection) -> Result<Vec<Subject>> {
    let mut stmt = conn
        .prepare("SELECT id, name, teacher_id FROM subjects ORDER BY id")
        .query_context("prepare subject query")?;

    let subjects = stmt
        .query_map([], subject_from_row)
        .query_context("load subjects")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .query_context("collect subjects")?;

    Ok(subjects)
}

pub fn update_subject(conn: &Connection, id: i64, name: &str, teacher_id: i64) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE subjects SET name = ?1, teacher_id = ?2 WHERE id = ?3",
            params![name, teacher_id, id],
        )
        .query_context("update subject")?;

    if updated == 0 {
        Err(RecordsError::NotFound { entity: "subject", id })
    } else {
        Ok(())
    }
}

/// Delete a subject. Its grades go with it through `ON DELETE CASCADE`.
pub fn delete_subject(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM subjects WHERE id = ?1", params![id])
        .query_context("delete subject")?;

    if deleted == 0 {
        Err(RecordsError::NotFound { entity: "subject", id })
    } else {
        debug!(id, "deleted subject and its grades");
        Ok(())
    }
}

/// The teacher of a subject, or `None` when the subject does not exist.
pub fn fetch_teacher_for_subject(conn: &Connection, subject_id: i64) -> Result<Option<Teacher>> {
    conn.query_row(
        "SELECT t.id, t.first_name, t.second_name, t.email, t.phone
         FROM teachers t
         INNER JOIN subjects s ON s.teacher_id = t.id
         WHERE s.id = ?1",
        params![subject_id],
        teacher_from_row,
    )
    .optional()
    .query_context("load subject teacher")
}

pub fn fetch_grades_for_subject(conn: &Connection, subject_id: i64) -> Result<Vec<Grade>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, student_id, subject_id, grade, date_received
             FROM grades
             WHERE subject_id = ?1
             ORDER BY date_received, id",
        )
        .query_context("prepare subject grades query")?;

    let grades = stmt
        .query_map([subject_id], grade_from_row)
        .query_context("load subject grades")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .query_context("collect subject grades")?;

    Ok(grades)
}
