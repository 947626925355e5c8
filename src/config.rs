//! Command-line and environment configuration for the `student-records`
//! binary. Library users never need this; they open a connection themselves.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use directories::BaseDirs;

use crate::seed::SeedPlan;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".student-records";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "records.sqlite";

/// Academic records store with a fixed set of grade reports.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file. Defaults to ~/.student-records/records.sqlite.
    #[arg(long, env = "STUDENT_RECORDS_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "student_records=trace".
    #[arg(long, env = "STUDENT_RECORDS_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fill an empty database with random groups, teachers, students and grades.
    Seed(SeedArgs),
    /// Print all ten reports.
    Report(ReportArgs),
}

#[derive(Debug, Args)]
pub struct SeedArgs {
    #[arg(long, default_value_t = 50)]
    pub students: usize,
    #[arg(long, default_value_t = 3)]
    pub groups: usize,
    #[arg(long, default_value_t = 5)]
    pub teachers: usize,
    #[arg(long, default_value_t = 8)]
    pub subjects: usize,
    /// Upper bound of grades recorded per student.
    #[arg(long, default_value_t = 20)]
    pub max_grades: usize,
    /// Fixed RNG seed for reproducible data.
    #[arg(long)]
    pub rng_seed: Option<u64>,
}

impl SeedArgs {
    pub fn plan(&self) -> SeedPlan {
        SeedPlan {
            groups: self.groups,
            teachers: self.teachers,
            subjects: self.subjects,
            students: self.students,
            max_grades_per_student: self.max_grades,
        }
    }
}

/// Identifiers fed to the parameterised reports.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Subject for the "top student" and "group averages" reports.
    #[arg(long, default_value_t = 2)]
    pub subject_id: i64,
    /// Teacher whose subjects and average grade are listed.
    #[arg(long, default_value_t = 1)]
    pub teacher_id: i64,
    /// Group for the roster and the group grades reports.
    #[arg(long, default_value_t = 3)]
    pub group_id: i64,
    /// Subject for the group grades report.
    #[arg(long, default_value_t = 1)]
    pub grade_subject_id: i64,
    #[arg(long, default_value_t = 1)]
    pub student_id: i64,
    /// Teacher for the "subjects of student with teacher" report.
    #[arg(long, default_value_t = 2)]
    pub student_teacher_id: i64,
}

impl Cli {
    /// Explicit `--db` / `STUDENT_RECORDS_DB`, else the per-user default.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.db {
            Some(path) => Ok(path.clone()),
            None => default_db_path(),
        }
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
pub fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
