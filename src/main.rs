//! Binary entry point: parse the command line, open the records database and
//! either seed it or print every report.
use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

use student_records::config::{Cli, Command, ReportArgs, SeedArgs};
use student_records::{db, reports, seed};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    let db_path = cli.db_path()?;
    if let Some(parent) = db_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }
    let conn = db::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;

    match &cli.command {
        Command::Seed(args) => run_seed(&conn, args),
        Command::Report(args) => run_reports(&conn, args),
    }
}

fn run_seed(conn: &Connection, args: &SeedArgs) -> Result<()> {
    let mut rng = match args.rng_seed {
        Some(value) => StdRng::seed_from_u64(value),
        None => StdRng::from_os_rng(),
    };
    let summary = seed::seed_database(conn, &mut rng, &args.plan()).context("failed to seed")?;

    println!(
        "Seeded {} groups, {} teachers, {} subjects, {} students, {} grades.",
        summary.groups, summary.teachers, summary.subjects, summary.students, summary.grades
    );
    Ok(())
}

/// Print a list of lines, or a placeholder when it is empty.
fn print_lines(lines: impl IntoIterator<Item = String>) {
    let mut empty = true;
    for line in lines {
        empty = false;
        println!("  {line}");
    }
    if empty {
        println!("  (no results)");
    }
}

fn print_average(value: Option<f64>) {
    match value {
        Some(avg) => println!("  {avg:.2}"),
        None => println!("  (no results)"),
    }
}

fn run_reports(conn: &Connection, args: &ReportArgs) -> Result<()> {
    println!("1. Top {} students by average grade:", reports::TOP_STUDENTS_LIMIT);
    print_lines(
        reports::top_students_overall(conn)?
            .into_iter()
            .map(|row| format!("{}: {:.2}", row.full_name, row.avg_grade)),
    );

    println!("\n2. Best student in subject {}:", args.subject_id);
    print_lines(
        reports::top_student_in_subject(conn, args.subject_id)?
            .map(|row| format!("{}: {:.2}", row.full_name, row.avg_grade)),
    );

    println!("\n3. Group averages in subject {}:", args.subject_id);
    print_lines(
        reports::group_averages_in_subject(conn, args.subject_id)?
            .into_iter()
            .map(|row| format!("{}: {:.2}", row.group_name, row.avg_grade)),
    );

    println!("\n4. Overall average grade:");
    print_average(reports::overall_average_grade(conn)?);

    println!("\n5. Subjects taught by teacher {}:", args.teacher_id);
    print_lines(reports::subjects_taught_by_teacher(conn, args.teacher_id)?);

    println!("\n6. Students in group {}:", args.group_id);
    print_lines(reports::students_in_group(conn, args.group_id)?);

    println!(
        "\n7. Grades in group {} for subject {}:",
        args.group_id, args.grade_subject_id
    );
    print_lines(
        reports::grades_for_group_and_subject(conn, args.group_id, args.grade_subject_id)?
            .into_iter()
            .map(|row| format!("{}: {} ({})", row.full_name, row.grade, row.date_received)),
    );

    println!("\n8. Average grade given by teacher {}:", args.teacher_id);
    print_average(reports::teacher_average_grade(conn, args.teacher_id)?);

    println!("\n9. Subjects attended by student {}:", args.student_id);
    print_lines(reports::subjects_attended_by_student(conn, args.student_id)?);

    println!(
        "\n10. Subjects of student {} taught by teacher {}:",
        args.student_id, args.student_teacher_id
    );
    print_lines(reports::subjects_of_student_with_teacher(
        conn,
        args.student_id,
        args.student_teacher_id,
    )?);

    Ok(())
}
