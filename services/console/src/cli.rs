use crate::allocate::{run_allocate, AllocateArgs};
use crate::demo::{run_demo, DemoArgs};
use clap::{Parser, Subcommand};
use course_hub::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "course-hub",
    about = "Run course-hub workflows against an in-memory store",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Distribute a course's unassigned applications from CSV exports
    Allocate(AllocateArgs),
    /// Walk a synthetic course through intake, allocation and review (default command)
    Demo(DemoArgs),
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));

    match command {
        Command::Allocate(args) => run_allocate(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
