mod allocate;
mod cli;
mod demo;
mod infra;

use course_hub::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
