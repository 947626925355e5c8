//! Domain models that mirror the SQLite schema. These stay plain data holders
//! so the persistence helpers and reports can hand them around freely.

use std::fmt;

use chrono::NaiveDateTime;

/// SQL form of [`Student::full_name`]. Expands to a string literal so it can be
/// spliced into statements with `concat!`; it expects the students table to
/// be addressed as `students`.
#[macro_export]
macro_rules! student_full_name {
    () => {
        "(students.first_name || ' ' || students.last_name)"
    };
}

#[derive(Debug, Clone, PartialEq)]
/// A cohort of students.
pub struct Group {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Teacher {
    pub id: i64,
    pub first_name: String,
    pub second_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
/// A course, taught by exactly one teacher.
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub teacher_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub group_id: i64,
}

impl Student {
    /// First and last name joined by a single space. Must stay byte-for-byte
    /// identical to [`student_full_name!`].
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One scored assessment of one student in one subject.
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub grade: f64,
    pub date_received: NaiveDateTime,
}

/// Insert payload for a teacher. Borrowed so callers can pass string slices.
#[derive(Debug, Clone, Copy)]
pub struct NewTeacher<'a> {
    pub first_name: &'a str,
    pub second_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewStudent<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub group_id: i64,
}

/// Insert payload for a grade. Leaving `date_received` empty lets the
/// database stamp the insertion time.
#[derive(Debug, Clone, Copy)]
pub struct NewGrade {
    pub student_id: i64,
    pub subject_id: i64,
    pub grade: f64,
    pub date_received: Option<NaiveDateTime>,
}

/// Row of the "top students" style reports.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentAverage {
    pub full_name: String,
    pub avg_grade: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupAverage {
    pub group_name: String,
    pub avg_grade: f64,
}

/// Individual grade joined with the student's name.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeRecord {
    pub full_name: String,
    pub grade: f64,
    pub date_received: NaiveDateTime,
}
