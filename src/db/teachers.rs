use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{QueryContext, RecordsError, Result};
use crate::models::{NewTeacher, Subject, Teacher};

use super::subjects::subject_from_row;

pub(crate) fn teacher_from_row(row: &Row<'_>) -> rusqlite::Result<Teacher> {
    Ok(Teacher {
        id: row.get(0)?,
        first_name: row.get(1)?,
        second_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
    })
}

pub fn create_teacher(conn: &Connection, teacher: NewTeacher<'_>) -> Result<Teacher> {
    conn.execute(
        "INSERT INTO teachers (first_name, second_name, email, phone) VALUES (?1, ?2, ?3, ?4)",
        params![
            teacher.first_name,
            teacher.second_name,
            teacher.email,
            teacher.phone
        ],
    )
    .query_context("insert teacher")?;

    let id = conn.last_insert_rowid();
    debug!(id, email = teacher.email, "created teacher");
    Ok(Teacher {
        id,
        first_name: teacher.first_name.to_string(),
        second_name: teacher.second_name.to_string(),
        email: teacher.email.to_string(),
        phone: teacher.phone.map(str::to_string),
    })
}

pub fn fetch_teacher(conn: &Connection, id: i64) -> Result<Option<Teacher>> {
    conn.query_row(
        "SELECT id, first_name, second_name, email, phone FROM teachers WHERE id = ?1",
        params![id],
        teacher_from_row,
    )
    .optional()
    .query_context("load teacher")
}

pub fn fetch_teachers(conn: &Connection) -> Result<Vec<Teacher>> {
    let mut stmt = conn
        .prepare("SELECT id, first_name, second_name, email, phone FROM teachers ORDER BY id")
        .query_context("prepare teacher query")?;

    let teachers = stmt
        .query_map([], teacher_from_row)
        .query_context("load teachers")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .query_context("collect teachers")?;

    Ok(teachers)
}

/// Overwrite every editable field of a teacher.
pub fn update_teacher(conn: &Connection, id: i64, teacher: NewTeacher<'_>) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE teachers SET first_name = ?1, second_name = ?2, email = ?3, phone = ?4
             WHERE id = ?5",
            params![
                teacher.first_name,
                teacher.second_name,
                teacher.email,
                teacher.phone,
                id
            ],
        )
        .query_context("update teacher")?;

    if updated == 0 {
        Err(RecordsError::NotFound { entity: "teacher", id })
    } else {
        Ok(())
    }
}

/// Remove a teacher. Fails with a constraint violation while the teacher
/// still has subjects; reassign or delete those first.
pub fn delete_teacher(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM teachers WHERE id = ?1", params![id])
        .query_context("delete teacher")?;

    if deleted == 0 {
        Err(RecordsError::NotFound { entity: "teacher", id })
    } else {
        debug!(id, "deleted teacher");
        Ok(())
    }
}

pub fn fetch_subjects_for_teacher(conn: &Connection, teacher_id: i64) -> Result<Vec<Subject>> {
    let mut stmt = conn
        .prepare("SELECT id, name, teacher_id FROM subjects WHERE teacher_id = ?1 ORDER BY id")
        .query_context("prepare teacher subjects query")?;

    let subjects = stmt
        .query_map([teacher_id], subject_from_row)
        .query_context("load teacher subjects")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .query_context("collect teacher subjects")?;

    Ok(subjects)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::{create_subject, delete_subject, open_in_memory};

    fn sample() -> NewTeacher<'static> {
        NewTeacher {
            first_name: "Iryna",
            second_name: "Shevchenko",
            email: "i.shevchenko@example.edu",
            phone: Some("+380501112233"),
        }
    }

    #[test]
    fn phone_is_optional() {
        let conn = open_in_memory().unwrap();
        let teacher = create_teacher(
            &conn,
            NewTeacher {
                phone: None,
                ..sample()
            },
        )
        .unwrap();

        let fetched = fetch_teacher(&conn, teacher.id).unwrap().unwrap();
        assert_eq!(fetched.phone, None);
        assert_eq!(fetched, teacher);
    }

    #[test]
    fn duplicate_email_leaves_store_unchanged() {
        let conn = open_in_memory().unwrap();
        let first = create_teacher(&conn, sample()).unwrap();

        let err = create_teacher(
            &conn,
            NewTeacher {
                first_name: "Other",
                ..sample()
            },
        )
        .unwrap_err();

        assert!(err.is_constraint_violation());
        assert_eq!(fetch_teachers(&conn).unwrap(), vec![first]);
    }

    #[test]
    fn update_rewrites_fields() {
        let conn = open_in_memory().unwrap();
        let teacher = create_teacher(&conn, sample()).unwrap();

        update_teacher(
            &conn,
            teacher.id,
            NewTeacher {
                email: "iryna@example.edu",
                phone: None,
                ..sample()
            },
        )
        .unwrap();

        let fetched = fetch_teacher(&conn, teacher.id).unwrap().unwrap();
        assert_eq!(fetched.email, "iryna@example.edu");
        assert_eq!(fetched.phone, None);

        let err = update_teacher(&conn, teacher.id + 1, sample()).unwrap_err();
        assert!(matches!(err, RecordsError::NotFound { entity: "teacher", .. }));
    }

    #[test]
    fn teacher_is_only_deletable_without_subjects() {
        let conn = open_in_memory().unwrap();
        let teacher = create_teacher(&conn, sample()).unwrap();
        let subject = create_subject(&conn, "Algebra", teacher.id).unwrap();

        assert_eq!(fetch_subjects_for_teacher(&conn, teacher.id).unwrap(), vec![subject.clone()]);
        assert!(delete_teacher(&conn, teacher.id)
            .unwrap_err()
            .is_constraint_violation());

        delete_subject(&conn, subject.id).unwrap();
        delete_teacher(&conn, teacher.id).unwrap();
        assert_eq!(fetch_teacher(&conn, teacher.id).unwrap(), None);
    }
}
