use crate::infra::{bootstrap, parse_date};
use chrono::NaiveDate;
use clap::Args;
use course_hub::error::AppError;
use course_hub::persistence::MemoryStore;
use course_hub::workflows::courses::CourseId;
use course_hub::workflows::import::SeedImporter;
use course_hub::workflows::users::UserId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AllocateArgs {
    /// Users CSV export (id, full_name, email, role, status, student_code)
    #[arg(long)]
    pub(crate) users: PathBuf,
    /// Applications CSV export (id, course_id, student_id, student_code, reviewer_id, status, created_at)
    #[arg(long)]
    pub(crate) applications: PathBuf,
    /// Course whose unassigned applications are distributed
    #[arg(long)]
    pub(crate) course: u64,
    /// Pin the clock to this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct AllocationReport {
    course_id: CourseId,
    newly_assigned: usize,
    secretaries: Vec<SecretaryRow>,
}

#[derive(Debug, Serialize)]
struct SecretaryRow {
    secretary_id: UserId,
    full_name: String,
    assigned: usize,
    received: usize,
}

pub(crate) async fn run_allocate(args: AllocateArgs) -> Result<(), AppError> {
    let AllocateArgs {
        users,
        applications,
        course,
        today,
        json,
    } = args;

    let runtime = bootstrap(today)?;
    SeedImporter::from_paths(users, applications, runtime.clock.now())?
        .load_into(&runtime.store);

    let course_id = CourseId(course);
    let before = loads_for(&runtime.store, course_id);
    runtime
        .applications
        .auto_assign_applications(course_id)
        .await?;
    let after = loads_for(&runtime.store, course_id);

    let secretaries = runtime
        .users
        .active_secretaries()
        .await?
        .into_iter()
        .map(|secretary| {
            let assigned = after.get(&secretary.id).copied().unwrap_or_default();
            let previous = before.get(&secretary.id).copied().unwrap_or_default();
            SecretaryRow {
                secretary_id: secretary.id,
                full_name: secretary.full_name,
                assigned,
                received: assigned.saturating_sub(previous),
            }
        })
        .collect::<Vec<_>>();
    let report = AllocationReport {
        course_id,
        newly_assigned: secretaries.iter().map(|row| row.received).sum(),
        secretaries,
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(payload) => println!("{}", payload),
            Err(err) => println!("Allocation report unavailable: {}", err),
        }
    } else {
        render_report(&report);
    }
    Ok(())
}

fn loads_for(store: &MemoryStore, course_id: CourseId) -> BTreeMap<UserId, usize> {
    let mut loads = BTreeMap::new();
    for application in store.applications.rows() {
        if application.course_id != course_id {
            continue;
        }
        if let Some(reviewer) = application.reviewer_id {
            *loads.entry(reviewer).or_default() += 1;
        }
    }
    loads
}

fn render_report(report: &AllocationReport) {
    println!("Allocation for course {}", report.course_id);
    println!(
        "- {} applications distributed across {} active secretaries",
        report.newly_assigned,
        report.secretaries.len()
    );
    for row in &report.secretaries {
        println!(
            "  - #{} {}: {} assigned (+{})",
            row.secretary_id, row.full_name, row.assigned, row.received
        );
    }
}
