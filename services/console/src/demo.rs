use crate::infra::{bootstrap, parse_date, Runtime};
use chrono::{Duration, NaiveDate, NaiveTime};
use clap::Args;
use course_hub::error::AppError;
use course_hub::workflows::applications::{ApplicationStatus, ReviewDecision};
use course_hub::workflows::courses::{Course, CourseStatus, NewCourse};
use course_hub::workflows::night_shifts::NewNightShift;
use course_hub::workflows::posts::{ImageUpload, NewPost};
use course_hub::workflows::teams::NewTeam;
use course_hub::workflows::users::{NewUser, Role, UserId, UserView};

const DEMO_PASSWORD: &str = "Demo@2025x";
const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Pin the clock to this date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Number of active secretaries to register
    #[arg(long, default_value_t = 3)]
    pub(crate) secretaries: u32,
    /// Number of students applying to the course
    #[arg(long, default_value_t = 7)]
    pub(crate) students: u32,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            today: None,
            secretaries: 3,
            students: 7,
        }
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let runtime = bootstrap(args.today)?;
    let today = runtime.clock.today();

    println!("course-hub demo ({})", today);
    let admin = runtime
        .users
        .create_user(account("Quản trị viên", "admin", Role::Admin, None))
        .await?;
    let mut secretaries = Vec::new();
    for index in 1..=args.secretaries {
        let draft = account(
            &format!("Thư ký {index}"),
            &format!("thuky{index}"),
            Role::Secretary,
            None,
        );
        secretaries.push(runtime.users.create_user(draft).await?);
    }
    let mut students = Vec::new();
    for index in 1..=args.students {
        let draft = account(
            &format!("Sinh viên {index}"),
            &format!("sv{index:03}"),
            Role::Student,
            Some(format!("SV{index:03}")),
        );
        students.push(runtime.users.create_user(draft).await?);
    }
    println!(
        "- registered 1 admin, {} secretaries, {} students ({} welcome e-mails)",
        secretaries.len(),
        students.len(),
        runtime.mailer.sent().len()
    );

    let course = open_course(&runtime, today, args.students.max(1)).await?;
    println!(
        "- course #{} '{}' open for applications {} to {}",
        course.id, course.name, course.application_start, course.application_end
    );

    for student in &students {
        runtime.applications.apply(student.id, course.id).await?;
    }
    println!("- {} applications submitted", students.len());

    runtime
        .applications
        .auto_assign_applications(course.id)
        .await?;
    println!("\nAllocation");
    for secretary in &secretaries {
        let queue = runtime
            .applications
            .list_for_reviewer(secretary.id, Some(ApplicationStatus::Pending))
            .await?;
        println!("  - {}: {} pending", secretary.full_name, queue.len());
    }

    println!("\nReview");
    let mut approved = Vec::new();
    for secretary in &secretaries {
        let queue = runtime
            .applications
            .list_for_reviewer(secretary.id, Some(ApplicationStatus::Pending))
            .await?;
        let last = queue.len().saturating_sub(1);
        for (position, application) in queue.into_iter().enumerate() {
            let reviewed = if position == last && position > 0 {
                runtime
                    .applications
                    .review(
                        application.id,
                        secretary.id,
                        ReviewDecision::Reject,
                        Some("Hồ sơ chưa đầy đủ".to_string()),
                    )
                    .await?
            } else {
                runtime
                    .applications
                    .review(application.id, secretary.id, ReviewDecision::Approve, None)
                    .await?
            };
            if reviewed.status == ApplicationStatus::Approved {
                approved.push(reviewed.student_id);
            }
            println!(
                "  - application #{} ({}) {}",
                reviewed.id,
                reviewed.student_code,
                reviewed.status.label()
            );
        }
    }

    build_team(&runtime, &course, &approved).await?;
    staff_first_night(&runtime, &course, &secretaries, admin.id).await?;

    let post = runtime
        .posts
        .create_post(
            admin.id,
            NewPost {
                title: format!("Chào mừng đến với {}", course.name),
                content: "Danh sách trúng tuyển đã được công bố.".to_string(),
                course_id: Some(course.id),
                published: true,
                image: Some(ImageUpload {
                    file_name: "banner.png".to_string(),
                    content_type: "image/png".to_string(),
                    bytes: PNG_HEADER.to_vec(),
                }),
            },
        )
        .await?;
    println!(
        "\nAnnouncement #{} published with image {}",
        post.id,
        post.image.map(|image| image.url).unwrap_or_default()
    );

    println!("\nOutbound");
    println!("  - notifications: {}", runtime.notifier.events().len());
    println!("  - e-mails: {}", runtime.mailer.sent().len());
    println!("  - blobs: {}", runtime.blobs.keys().len());
    println!("  - commits: {}", runtime.store.commit_count());
    Ok(())
}

fn account(full_name: &str, handle: &str, role: Role, student_code: Option<String>) -> NewUser {
    NewUser {
        full_name: full_name.to_string(),
        email: format!("{handle}@course-hub.local"),
        password: DEMO_PASSWORD.to_string(),
        role,
        student_code,
        phone: None,
    }
}

/// Applications open three days ago and close in ten; the course starts two
/// weeks out and runs for a month.
async fn open_course(runtime: &Runtime, today: NaiveDate, seats: u32) -> Result<Course, AppError> {
    let course = runtime
        .courses
        .create_course(NewCourse {
            name: format!("Mùa hè xanh {}", today.format("%Y")),
            description: "Chiến dịch tình nguyện hè".to_string(),
            location: "Trà Vinh".to_string(),
            max_students: seats,
            start_date: today + Duration::days(14),
            end_date: today + Duration::days(44),
            application_start: today - Duration::days(3),
            application_end: today + Duration::days(10),
        })
        .await?;
    let course = runtime
        .courses
        .set_status(course.id, CourseStatus::Open)
        .await?;
    Ok(course)
}

async fn build_team(runtime: &Runtime, course: &Course, approved: &[UserId]) -> Result<(), AppError> {
    let Some(leader) = approved.first().copied() else {
        println!("\nNo approved students, skipping teams");
        return Ok(());
    };
    let team = runtime
        .teams
        .create_team(NewTeam {
            course_id: course.id,
            name: "Đội 1".to_string(),
            max_members: approved.len() as u32,
        })
        .await?;
    for student_id in approved {
        runtime.teams.add_member(team.id, *student_id).await?;
    }
    let team = runtime.teams.set_leader(team.id, leader).await?;
    println!(
        "\nTeam '{}' formed with {} members, leader #{}",
        team.name,
        team.member_ids.len(),
        leader
    );
    Ok(())
}

async fn staff_first_night(
    runtime: &Runtime,
    course: &Course,
    secretaries: &[UserView],
    assigned_by: UserId,
) -> Result<(), AppError> {
    let required_staff = secretaries.len().clamp(1, 2) as u32;
    let shift = runtime
        .night_shifts
        .create_shift(NewNightShift {
            course_id: course.id,
            date: course.start_date,
            start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
            end_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
            location: course.location.clone(),
            required_staff,
            note: None,
        })
        .await?;
    for secretary in secretaries.iter().take(required_staff as usize) {
        runtime
            .night_shifts
            .assign_staff(shift.id, secretary.id, assigned_by)
            .await?;
    }
    let staffed = runtime.night_shifts.assignments_for_shift(shift.id).await?;
    println!(
        "Night shift #{} on {} ({}h) staffed by {} of {}",
        shift.id,
        shift.date,
        shift.duration().num_hours(),
        staffed.len(),
        shift.required_staff
    );
    Ok(())
}
