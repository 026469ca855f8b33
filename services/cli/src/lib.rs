mod cli;
mod demo;
mod session;
mod validate;

use details_form::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
