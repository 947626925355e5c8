use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{QueryContext, RecordsError, Result};
use crate::models::{Grade, NewGrade};

pub(crate) fn grade_from_row(row: &Row<'_>) -> rusqlite::Result<Grade> {
    Ok(Grade {
        id: row.get(0)?,
        student_id: row.get(1)?,
        subject_id: row.get(2)?,
        grade: row.get(3)?,
        date_received: row.get(4)?,
    })
}

/// SQLite quietly turns NaN into NULL and accepts infinities, so grade values
/// are checked before they reach the statement.
fn check_grade_value(action: &'static str, grade: f64) -> Result<()> {
    if grade.is_finite() {
        Ok(())
    } else {
        Err(RecordsError::ConstraintViolation {
            action,
            detail: format!("grade must be a finite number, got {grade}"),
        })
    }
}

/// Record a grade. When `date_received` is `None` the row is stamped with
/// the current time; the stored timestamp is read back into the result.
pub fn create_grade(conn: &Connection, grade: NewGrade) -> Result<Grade> {
    check_grade_value("insert grade", grade.grade)?;

    let created = conn
        .query_row(
            "INSERT INTO grades (student_id, subject_id, grade, date_received)
             VALUES (?1, ?2, ?3, COALESCE(?4, CURRENT_TIMESTAMP))
             RETURNING id, student_id, subject_id, grade, date_received",
            params![
                grade.student_id,
                grade.subject_id,
                grade.grade,
                grade.date_received
            ],
            grade_from_row,
        )
        .query_context("insert grade")?;

    debug!(
        id = created.id,
        student_id = created.student_id,
        subject_id = created.subject_id,
        "recorded grade"
    );
    Ok(created)
}

pub fn fetch_grade(conn: &Connection, id: i64) -> Result<Option<Grade>> {
    conn.query_row(
        "SELECT id, student_id, subject_id, grade, date_received FROM grades WHERE id = ?1",
        params![id],
        grade_from_row,
    )
    .optional()
    .query_context("load grade")
}

/// Correct the value of an existing grade.
pub fn update_grade(conn: &Connection, id: i64, grade: f64) -> Result<()> {
    check_grade_value("update grade", grade)?;

    let updated = conn
        .execute("UPDATE grades SET grade = ?1 WHERE id = ?2", params![grade, id])
        .query_context("update grade")?;

    if updated == 0 {
        Err(RecordsError::NotFound { entity: "grade", id })
    } else {
        Ok(())
    }
}

pub fn delete_grade(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM grades WHERE id = ?1", params![id])
        .query_context("delete grade")?;

    if deleted == 0 {
        Err(RecordsError::NotFound { entity: "grade", id })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::{
        create_group, create_student, create_subject, create_teacher, delete_student,
        fetch_grades_for_student, open_in_memory,
    };
    use crate::models::{NewStudent, NewTeacher};

    /// One group, one teacher, one subject and two students.
    fn fixture(conn: &Connection) -> (i64, i64, i64) {
        let group = create_group(conn, "MA-1").unwrap();
        let teacher = create_teacher(
            conn,
            NewTeacher {
                first_name: "Oksana",
                second_name: "Lysenko",
                email: "oksana@example.edu",
                phone: None,
            },
        )
        .unwrap();
        let subject = create_subject(conn, "Calculus", teacher.id).unwrap();
        let first = create_student(
            conn,
            NewStudent {
                first_name: "Dmytro",
                last_name: "Hnatiuk",
                email: "dmytro@example.edu",
                phone: None,
                group_id: group.id,
            },
        )
        .unwrap();
        let second = create_student(
            conn,
            NewStudent {
                first_name: "Sofiia",
                last_name: "Moroz",
                email: "sofiia@example.edu",
                phone: None,
                group_id: group.id,
            },
        )
        .unwrap();
        (subject.id, first.id, second.id)
    }

    #[test]
    fn missing_date_defaults_to_insertion_time() {
        let conn = open_in_memory().unwrap();
        let (subject_id, student_id, _) = fixture(&conn);
        let before = Utc::now().naive_utc() - chrono::Duration::seconds(1);

        let grade = create_grade(
            &conn,
            NewGrade {
                student_id,
                subject_id,
                grade: 88.5,
                date_received: None,
            },
        )
        .unwrap();

        let after = Utc::now().naive_utc() + chrono::Duration::seconds(1);
        assert!(grade.date_received >= before && grade.date_received <= after);
        assert_eq!(fetch_grade(&conn, grade.id).unwrap(), Some(grade));
    }

    #[test]
    fn explicit_date_is_kept() {
        let conn = open_in_memory().unwrap();
        let (subject_id, student_id, _) = fixture(&conn);
        let when = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();

        let grade = create_grade(
            &conn,
            NewGrade {
                student_id,
                subject_id,
                grade: 61.0,
                date_received: Some(when),
            },
        )
        .unwrap();

        assert_eq!(grade.date_received, when);
    }

    #[test]
    fn dangling_references_are_rejected() {
        let conn = open_in_memory().unwrap();
        let (subject_id, student_id, _) = fixture(&conn);

        for (student_id, subject_id) in [(student_id, subject_id + 10), (student_id + 10, subject_id)] {
            let err = create_grade(
                &conn,
                NewGrade {
                    student_id,
                    subject_id,
                    grade: 50.0,
                    date_received: None,
                },
            )
            .unwrap_err();
            assert!(err.is_constraint_violation());
        }
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let conn = open_in_memory().unwrap();
        let (subject_id, student_id, _) = fixture(&conn);

        for value in [f64::NAN, f64::INFINITY] {
            let err = create_grade(
                &conn,
                NewGrade {
                    student_id,
                    subject_id,
                    grade: value,
                    date_received: None,
                },
            )
            .unwrap_err();
            assert!(err.is_constraint_violation());
        }
        assert!(fetch_grades_for_student(&conn, student_id).unwrap().is_empty());
    }

    #[test]
    fn update_and_delete() {
        let conn = open_in_memory().unwrap();
        let (subject_id, student_id, _) = fixture(&conn);
        let grade = create_grade(
            &conn,
            NewGrade {
                student_id,
                subject_id,
                grade: 40.0,
                date_received: None,
            },
        )
        .unwrap();

        update_grade(&conn, grade.id, 45.0).unwrap();
        assert_eq!(fetch_grade(&conn, grade.id).unwrap().unwrap().grade, 45.0);

        delete_grade(&conn, grade.id).unwrap();
        assert_eq!(fetch_grade(&conn, grade.id).unwrap(), None);
        assert!(matches!(
            delete_grade(&conn, grade.id).unwrap_err(),
            RecordsError::NotFound { entity: "grade", .. }
        ));
    }

    #[test]
    fn deleting_student_cascades_to_their_grades_only() {
        let conn = open_in_memory().unwrap();
        let (subject_id, first, second) = fixture(&conn);
        for student_id in [first, first, second] {
            create_grade(
                &conn,
                NewGrade {
                    student_id,
                    subject_id,
                    grade: 75.0,
                    date_received: None,
                },
            )
            .unwrap();
        }

        delete_student(&conn, first).unwrap();

        assert!(fetch_grades_for_student(&conn, first).unwrap().is_empty());
        assert_eq!(fetch_grades_for_student(&conn, second).unwrap().len(), 1);
    }
}
