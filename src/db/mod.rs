//! Persistence module split across one submodule per table.

mod connection;
mod grades;
mod groups;
mod students;
mod subjects;
mod teachers;

pub use connection::{ensure_schema, open, open_in_memory};
pub use grades::{create_grade, delete_grade, fetch_grade, update_grade};
pub use groups::{
    create_group, delete_group, fetch_group, fetch_groups, fetch_students_for_group, update_group,
};
pub use students::{
    create_student, delete_student, fetch_grades_for_student, fetch_group_for_student,
    fetch_student, fetch_students, update_student,
};
pub use subjects::{
    create_subject, delete_subject, fetch_grades_for_subject, fetch_subject, fetch_subjects,
    fetch_teacher_for_subject, update_subject,
};
pub use teachers::{
    create_teacher, delete_teacher, fetch_subjects_for_teacher, fetch_teacher, fetch_teachers,
    update_teacher,
};
