//! Schema CLI, e.g. `cargo run -p migration -- up` or `-- status`.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    cli::run_cli(migration::Migrator).await;
}
