//! The ten read-only reports. Each one is a single statement over a live
//! connection: nothing is cached and no report depends on another.
//!
//! Averages are `AVG` over inner joins, so students, groups and teachers
//! without matching grades simply do not appear. An empty result is `None`
//! or an empty `Vec`, never `0.0`. Rankings with equal averages fall back to
//! ascending id so repeated runs over the same data agree.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::instrument;

use crate::error::{QueryContext, Result};
use crate::models::{GradeRecord, GroupAverage, StudentAverage};
use crate::student_full_name;

/// How many students [`top_students_overall`] returns at most.
pub const TOP_STUDENTS_LIMIT: i64 = 5;

fn student_average_from_row(row: &Row<'_>) -> rusqlite::Result<StudentAverage> {
    Ok(StudentAverage {
        full_name: row.get(0)?,
        avg_grade: row.get(1)?,
    })
}

/// Run a statement whose rows are a single text column.
fn collect_names(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
    action: &'static str,
) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql).query_context(action)?;

    let names = stmt
        .query_map(params, |row| row.get(0))
        .query_context(action)?
        .collect::<rusqlite::Result<Vec<String>>>()
        .query_context(action)?;

    Ok(names)
}

/// Students with the best average across all subjects, best first.
#[instrument(level = "debug", skip(conn))]
pub fn top_students_overall(conn: &Connection) -> Result<Vec<StudentAverage>> {
    let mut stmt = conn
        .prepare(concat!(
            "SELECT ",
            student_full_name!(),
            " AS full_name, AVG(grades.grade) AS avg_grade
             FROM students
             INNER JOIN grades ON grades.student_id = students.id
             GROUP BY students.id
             ORDER BY avg_grade DESC, students.id
             LIMIT ?1"
        ))
        .query_context("prepare top students report")?;

    let rows = stmt
        .query_map([TOP_STUDENTS_LIMIT], student_average_from_row)
        .query_context("run top students report")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .query_context("collect top students report")?;

    Ok(rows)
}

/// The student with the highest average in one subject.
#[instrument(level = "debug", skip(conn))]
pub fn top_student_in_subject(conn: &Connection, subject_id: i64) -> Result<Option<StudentAverage>> {
    conn.query_row(
        concat!(
            "SELECT ",
            student_full_name!(),
            " AS full_name, AVG(grades.grade) AS avg_grade
             FROM students
             INNER JOIN grades ON grades.student_id = students.id
             WHERE grades.subject_id = ?1
             GROUP BY students.id
             ORDER BY avg_grade DESC, students.id
             LIMIT 1"
        ),
        params![subject_id],
        student_average_from_row,
    )
    .optional()
    .query_context("run top student in subject report")
}

/// Average grade per group in one subject, best group first.
#[instrument(level = "debug", skip(conn))]
pub fn group_averages_in_subject(conn: &Connection, subject_id: i64) -> Result<Vec<GroupAverage>> {
    let mut stmt = conn
        .prepare(
            "SELECT groups.name, AVG(grades.grade) AS avg_grade
             FROM groups
             INNER JOIN students ON students.group_id = groups.id
             INNER JOIN grades ON grades.student_id = students.id
             WHERE grades.subject_id = ?1
             GROUP BY groups.id
             ORDER BY avg_grade DESC, groups.id",
        )
        .query_context("prepare group averages report")?;

    let rows = stmt
        .query_map([subject_id], |row| {
            Ok(GroupAverage {
                group_name: row.get(0)?,
                avg_grade: row.get(1)?,
            })
        })
        .query_context("run group averages report")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .query_context("collect group averages report")?;

    Ok(rows)
}

/// Mean of every grade in the store.
#[instrument(level = "debug", skip(conn))]
pub fn overall_average_grade(conn: &Connection) -> Result<Option<f64>> {
    // AVG over zero rows is NULL.
    conn.query_row("SELECT AVG(grade) FROM grades", [], |row| row.get(0))
        .query_context("run overall average report")
}

#[instrument(level = "debug", skip(conn))]
pub fn subjects_taught_by_teacher(conn: &Connection, teacher_id: i64) -> Result<Vec<String>> {
    collect_names(
        conn,
        "SELECT name FROM subjects WHERE teacher_id = ?1 ORDER BY id",
        [teacher_id],
        "run teacher subjects report",
    )
}

/// Full names of the students in a group.
#[instrument(level = "debug", skip(conn))]
pub fn students_in_group(conn: &Connection, group_id: i64) -> Result<Vec<String>> {
    collect_names(
        conn,
        concat!(
            "SELECT ",
            student_full_name!(),
            " FROM students WHERE group_id = ?1 ORDER BY id"
        ),
        [group_id],
        "run group roster report",
    )
}

/// Every grade given in `subject_id` to a member of `group_id`, oldest first.
#[instrument(level = "debug", skip(conn))]
pub fn grades_for_group_and_subject(
    conn: &Connection,
    group_id: i64,
    subject_id: i64,
) -> Result<Vec<GradeRecord>> {
    let mut stmt = conn
        .prepare(concat!(
            "SELECT ",
            student_full_name!(),
            ", grades.grade, grades.date_received
             FROM students
             INNER JOIN grades ON grades.student_id = students.id
             WHERE students.group_id = ?1 AND grades.subject_id = ?2
             ORDER BY grades.date_received, grades.id"
        ))
        .query_context("prepare group grades report")?;

    let rows = stmt
        .query_map(params![group_id, subject_id], |row| {
            Ok(GradeRecord {
                full_name: row.get(0)?,
                grade: row.get(1)?,
                date_received: row.get(2)?,
            })
        })
        .query_context("run group grades report")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .query_context("collect group grades report")?;

    Ok(rows)
}

/// Mean of all grades given in the teacher's subjects.
#[instrument(level = "debug", skip(conn))]
pub fn teacher_average_grade(conn: &Connection, teacher_id: i64) -> Result<Option<f64>> {
    conn.query_row(
        "SELECT AVG(grades.grade)
         FROM grades
         INNER JOIN subjects ON subjects.id = grades.subject_id
         WHERE subjects.teacher_id = ?1",
        params![teacher_id],
        |row| row.get(0),
    )
    .query_context("run teacher average report")
}

/// Subjects the student has at least one grade in. Subject names are unique,
/// so grouping by subject id yields each name once.
#[instrument(level = "debug", skip(conn))]
pub fn subjects_attended_by_student(conn: &Connection, student_id: i64) -> Result<Vec<String>> {
    collect_names(
        conn,
        "SELECT subjects.name
         FROM subjects
         INNER JOIN grades ON grades.subject_id = subjects.id
         WHERE grades.student_id = ?1
         GROUP BY subjects.id
         ORDER BY subjects.id",
        [student_id],
        "run student subjects report",
    )
}

#[instrument(level = "debug", skip(conn))]
pub fn subjects_of_student_with_teacher(
    conn: &Connection,
    student_id: i64,
    teacher_id: i64,
) -> Result<Vec<String>> {
    collect_names(
        conn,
        "SELECT subjects.name
         FROM subjects
         INNER JOIN grades ON grades.subject_id = subjects.id
         WHERE grades.student_id = ?1 AND subjects.teacher_id = ?2
         GROUP BY subjects.id
         ORDER BY subjects.id",
        [student_id, teacher_id],
        "run student teacher subjects report",
    )
}
