use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{QueryContext, RecordsError, Result};
use crate::models::{Grade, Group, NewStudent, Student};

use super::grades::grade_from_row;

pub(crate) fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        group_id: row.get(5)?,
    })
}

/// Insert a student into an existing group. Duplicate emails and unknown
/// groups fail with a constraint violation and insert nothing.
pub fn create_student(conn: &Connection, student: NewStudent<'_>) -> Result<Student> {
    conn.execute(
        "INSERT INTO students (first_name, last_name, email, phone, group_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            student.first_name,
            student.last_name,
            student.email,
            student.phone,
            student.group_id
        ],
    )
    .query_context("insert student")?;

    let id = conn.last_insert_rowid();
    debug!(id, group_id = student.group_id, "created student");
    Ok(Student {
        id,
        first_name: student.first_name.to_string(),
        last_name: student.last_name.to_string(),
        email: student.email.to_string(),
        phone: student.phone.map(str::to_string),
        group_id: student.group_id,
    })
}

pub fn fetch_student(conn: &Connection, id: i64) -> Result<Option<Student>> {
    conn.query_row(
        "SELECT id, first_name, last_name, email, phone, group_id FROM students WHERE id = ?1",
        params![id],
        student_from_row,
    )
    .optional()
    .query_context("load student")
}

pub fn fetch_students(conn: &Connection) -> Result<Vec<Student>> {
    let mut stmt = conn
        .prepare("SELECT id, first_name, last_name, email, phone, group_id FROM students ORDER BY id")
        .query_context("prepare student query")?;

    let students = stmt
        .query_map([], student_from_row)
        .query_context("load students")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .query_context("collect students")?;

    Ok(students)
}

pub fn update_student(conn: &Connection, id: i64, student: NewStudent<'_>) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE students
             SET first_name = ?1, last_name = ?2, email = ?3, phone = ?4, group_id = ?5
             WHERE id = ?6",
            params![
                student.first_name,
                student.last_name,
                student.email,
                student.phone,
                student.group_id,
                id
            ],
        )
        .query_context("update student")?;

    if updated == 0 {
        Err(RecordsError::NotFound { entity: "student", id })
    } else {
        Ok(())
    }
}

/// Delete a student together with every grade they received.
pub fn delete_student(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM students WHERE id = ?1", params![id])
        .query_context("delete student")?;

    if deleted == 0 {
        Err(RecordsError::NotFound { entity: "student", id })
    } else {
        debug!(id, "deleted student and their grades");
        Ok(())
    }
}

pub fn fetch_group_for_student(conn: &Connection, student_id: i64) -> Result<Option<Group>> {
    conn.query_row(
        "SELECT g.id, g.name
         FROM groups g
         INNER JOIN students s ON s.group_id = g.id
         WHERE s.id = ?1",
        params![student_id],
        |row| {
            Ok(Group {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()
    .query_context("load student group")
}

pub fn fetch_grades_for_student(conn: &Connection, student_id: i64) -> Result<Vec<Grade>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, student_id, subject_id, grade, date_received
             FROM grades
             WHERE student_id = ?1
             ORDER BY date_received, id",
        )
        .query_context("prepare student grades query")?;

    let grades = stmt
        .query_map([student_id], grade_from_row)
        .query_context("load student grades")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .query_context("collect student grades")?;

    Ok(grades)
}
