mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use cosmic_beats::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
