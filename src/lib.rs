//! Academic records (groups, teachers, subjects, students, grades) stored in
//! SQLite, plus ten read-only reports over them.
//!
//! Open a connection with [`db::open`] or [`db::open_in_memory`], use the
//! `db` helpers to write rows, and call the functions in [`reports`] to read
//! aggregates back. The connection is released when it is dropped.
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod reports;
pub mod seed;

pub use error::{RecordsError, Result};
pub use models::{
    Grade, GradeRecord, Group, GroupAverage, NewGrade, NewStudent, NewTeacher, Student,
    StudentAverage, Subject, Teacher,
};
