//! Random sample data for trying the reports out.
//!
//! Everything goes in through the regular `db::create_*` helpers inside one
//! transaction, so a failing insert leaves the database as it was.

use chrono::{Duration, NaiveDateTime, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use rusqlite::Connection;
use tracing::info;

use crate::db::{create_grade, create_group, create_student, create_subject, create_teacher};
use crate::error::{QueryContext, RecordsError, Result};
use crate::models::{NewGrade, NewStudent, NewTeacher};

const FIRST_NAMES: &[&str] = &[
    "Andrii", "Bohdana", "Dmytro", "Halyna", "Ivan", "Kateryna", "Maksym", "Nadiia", "Oleh",
    "Oksana", "Petro", "Roman", "Sofiia", "Taras", "Yulia", "Zakhar",
];
const LAST_NAMES: &[&str] = &[
    "Bondarenko", "Hnatiuk", "Koval", "Kravchenko", "Lysenko", "Melnyk", "Moroz", "Petrenko",
    "Savchenko", "Shevchenko", "Tkachenko", "Vasylenko",
];
const SUBJECT_NAMES: &[&str] = &[
    "Mathematics", "Physics", "Chemistry", "Biology", "History", "Literature", "Philosophy",
    "Economics", "Computer Science", "Statistics", "Geography", "Art History",
];

/// Grades are whole numbers on a 100 point scale.
const GRADE_RANGE: std::ops::RangeInclusive<u32> = 1..=100;
/// Grade dates are spread over this many days before now.
const HISTORY_DAYS: i64 = 365;

/// How many rows of each kind to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    pub groups: usize,
    pub teachers: usize,
    pub subjects: usize,
    pub students: usize,
    pub max_grades_per_student: usize,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            groups: 3,
            teachers: 5,
            subjects: 8,
            students: 50,
            max_grades_per_student: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub groups: usize,
    pub teachers: usize,
    pub subjects: usize,
    pub students: usize,
    pub grades: usize,
}

fn check_plan(plan: &SeedPlan) -> Result<()> {
    let detail = if plan.students > 0 && plan.groups == 0 {
        "students need at least one group"
    } else if plan.subjects > 0 && plan.teachers == 0 {
        "subjects need at least one teacher"
    } else if plan.max_grades_per_student > 0 && plan.students > 0 && plan.subjects == 0 {
        "grades need at least one subject"
    } else {
        return Ok(());
    };

    Err(RecordsError::ConstraintViolation {
        action: "seed database",
        detail: detail.to_string(),
    })
}

/// Pick a name from `pool`, adding a numeric suffix once the pool runs out so
/// unique columns never collide.
fn indexed_name(pool: &[&str], index: usize) -> String {
    let base = pool[index % pool.len()];
    match index / pool.len() {
        0 => base.to_string(),
        round => format!("{base} {}", round + 1),
    }
}

fn random_date(rng: &mut impl Rng, now: NaiveDateTime) -> NaiveDateTime {
    now - Duration::seconds(rng.random_range(0..HISTORY_DAYS * 24 * 60 * 60))
}

/// Populate the store according to `plan`.
pub fn seed_database(conn: &Connection, rng: &mut impl Rng, plan: &SeedPlan) -> Result<SeedSummary> {
    check_plan(plan)?;

    let tx = conn
        .unchecked_transaction()
        .query_context("begin seed transaction")?;
    let mut summary = SeedSummary::default();

    let mut group_ids = Vec::with_capacity(plan.groups);
    for index in 0..plan.groups {
        let name = format!("GR-{:02}", index + 1);
        group_ids.push(create_group(&tx, &name)?.id);
        summary.groups += 1;
    }

    let mut teacher_ids = Vec::with_capacity(plan.teachers);
    for index in 0..plan.teachers {
        let first_name = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
        let second_name = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
        let email = format!(
            "{}.{}.{}@staff.example.edu",
            first_name.to_lowercase(),
            second_name.to_lowercase(),
            index + 1
        );
        let phone = format!("+38050{:07}", rng.random_range(0..10_000_000u32));
        let teacher = create_teacher(
            &tx,
            NewTeacher {
                first_name,
                second_name,
                email: &email,
                phone: Some(&phone),
            },
        )?;
        teacher_ids.push(teacher.id);
        summary.teachers += 1;
    }

    let mut subject_ids = Vec::with_capacity(plan.subjects);
    for index in 0..plan.subjects {
        let name = indexed_name(SUBJECT_NAMES, index);
        // Round-robin first so every teacher gets something, then random.
        let teacher_id = match teacher_ids.get(index) {
            Some(id) => *id,
            None => *teacher_ids
                .choose(rng)
                .ok_or_else(|| RecordsError::ConstraintViolation {
                    action: "seed database",
                    detail: "subjects need at least one teacher".to_string(),
                })?,
        };
        subject_ids.push(create_subject(&tx, &name, teacher_id)?.id);
        summary.subjects += 1;
    }

    let now = Utc::now().naive_utc();
    for index in 0..plan.students {
        let first_name = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
        let last_name = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
        let email = format!(
            "{}.{}.{}@example.edu",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            index + 1
        );
        let phone = rng
            .random_bool(0.7)
            .then(|| format!("+38067{:07}", rng.random_range(0..10_000_000u32)));
        let group_id = group_ids[index % group_ids.len()];
        let student = create_student(
            &tx,
            NewStudent {
                first_name,
                last_name,
                email: &email,
                phone: phone.as_deref(),
                group_id,
            },
        )?;
        summary.students += 1;

        if subject_ids.is_empty() {
            continue;
        }
        let grade_count = rng.random_range(0..=plan.max_grades_per_student);
        for _ in 0..grade_count {
            let subject_id = subject_ids[rng.random_range(0..subject_ids.len())];
            create_grade(
                &tx,
                NewGrade {
                    student_id: student.id,
                    subject_id,
                    grade: f64::from(rng.random_range(GRADE_RANGE)),
                    date_received: Some(random_date(rng, now)),
                },
            )?;
            summary.grades += 1;
        }
    }

    tx.commit().query_context("commit seed transaction")?;
    info!(
        groups = summary.groups,
        teachers = summary.teachers,
        subjects = summary.subjects,
        students = summary.students,
        grades = summary.grades,
        "seeded database"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::db::{create_group, fetch_groups, fetch_students, fetch_subjects, open_in_memory};
    use crate::reports;

    #[test]
    fn seeds_requested_counts() {
        let conn = open_in_memory().unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let summary = seed_database(&conn, &mut rng, &SeedPlan::default()).unwrap();

        assert_eq!(summary.groups, 3);
        assert_eq!(summary.teachers, 5);
        assert_eq!(summary.subjects, 8);
        assert_eq!(summary.students, 50);
        assert_eq!(fetch_students(&conn).unwrap().len(), 50);
        assert_eq!(fetch_subjects(&conn).unwrap().len(), 8);

        let grades: i64 = conn
            .query_row("SELECT COUNT(*) FROM grades", [], |row| row.get(0))
            .unwrap();
        assert_eq!(grades as usize, summary.grades);
        if summary.grades > 0 {
            let average = reports::overall_average_grade(&conn).unwrap().unwrap();
            assert!((1.0..=100.0).contains(&average));
        }
    }

    #[test]
    fn names_wrap_with_suffixes() {
        assert_eq!(indexed_name(SUBJECT_NAMES, 0), "Mathematics");
        assert_eq!(indexed_name(SUBJECT_NAMES, SUBJECT_NAMES.len()), "Mathematics 2");
    }

    #[test]
    fn more_subjects_than_names_still_seed() {
        let conn = open_in_memory().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let plan = SeedPlan {
            subjects: SUBJECT_NAMES.len() + 3,
            students: 4,
            ..SeedPlan::default()
        };

        let summary = seed_database(&conn, &mut rng, &plan).unwrap();
        assert_eq!(summary.subjects, SUBJECT_NAMES.len() + 3);
    }

    #[test]
    fn failed_seed_rolls_back() {
        let conn = open_in_memory().unwrap();
        create_group(&conn, "GR-02").unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let err = seed_database(&conn, &mut rng, &SeedPlan::default()).unwrap_err();

        assert!(err.is_constraint_violation());
        assert_eq!(fetch_groups(&conn).unwrap().len(), 1);
        assert!(fetch_students(&conn).unwrap().is_empty());
    }

    #[test]
    fn plan_without_groups_is_rejected() {
        let conn = open_in_memory().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let plan = SeedPlan {
            groups: 0,
            ..SeedPlan::default()
        };

        assert!(seed_database(&conn, &mut rng, &plan)
            .unwrap_err()
            .is_constraint_violation());
    }
}
