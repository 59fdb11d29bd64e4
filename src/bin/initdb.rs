//! Administrative binary that (re)creates the booking schema
//!
//! Drops the `person`, `activity` and `event` tables of the configured
//! database and creates them empty.

use booking_ledger::config::Config;
use booking_ledger::storage::BookingDb;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    let db = BookingDb::new(&config.database.path, 1).await?;
    db.reset_schema().await?;

    info!("Initialized the database at {}", config.database.path);
    println!("Initialized the database.");
    Ok(())
}
