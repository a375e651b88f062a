//! Migration tool entry point
//!
//! `sea-orm-cli migrate up -d ./migration -u <url>` runs this binary; it can also be
//! run directly: `cargo run -p migration -- up -u <url>`.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}
