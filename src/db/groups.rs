use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{QueryContext, RecordsError, Result};
use crate::models::{Group, Student};

use super::students::student_from_row;

/// Insert a new group and hand back the hydrated struct.
pub fn create_group(conn: &Connection, name: &str) -> Result<Group> {
    conn.execute("INSERT INTO groups (name) VALUES (?1)", params![name])
        .query_context("insert group")?;

    let id = conn.last_insert_rowid();
    debug!(id, name, "created group");
    Ok(Group {
        id,
        name: name.to_string(),
    })
}

pub fn fetch_group(conn: &Connection, id: i64) -> Result<Option<Group>> {
    conn.query_row(
        "SELECT id, name FROM groups WHERE id = ?1",
        params![id],
        |row| {
            Ok(Group {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()
    .query_context("load group")
}

/// Every group ordered by id.
pub fn fetch_groups(conn: &Connection) -> Result<Vec<Group>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM groups ORDER BY id")
        .query_context("prepare group query")?;

    let groups = stmt
        .query_map([], |row| {
            Ok(Group {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .query_context("load groups")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .query_context("collect groups")?;

    Ok(groups)
}

pub fn update_group(conn: &Connection, id: i64, name: &str) -> Result<()> {
    let updated = conn
        .execute("UPDATE groups SET name = ?1 WHERE id = ?2", params![name, id])
        .query_context("update group")?;

    if updated == 0 {
        Err(RecordsError::NotFound { entity: "group", id })
    } else {
        Ok(())
    }
}

/// Remove a group. Students reference their group with `RESTRICT`, so this
/// fails with a constraint violation until the group is empty.
pub fn delete_group(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM groups WHERE id = ?1", params![id])
        .query_context("delete group")?;

    if deleted == 0 {
        Err(RecordsError::NotFound { entity: "group", id })
    } else {
        debug!(id, "deleted group");
        Ok(())
    }
}

/// Students enrolled in a group, by id.
pub fn fetch_students_for_group(conn: &Connection, group_id: i64) -> Result<Vec<Student>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, first_name, last_name, email, phone, group_id
             FROM students
             WHERE group_id = ?1
             ORDER BY id",
        )
        .query_context("prepare group students query")?;

    let students = stmt
        .query_map([group_id], student_from_row)
        .query_context("load group students")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .query_context("collect group students")?;

    Ok(students)
}
