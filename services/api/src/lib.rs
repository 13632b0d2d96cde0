mod cli;
mod export;
mod infra;
mod report;
mod routes;
mod server;

use peer_review::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
