use food_aggregator::{
    api::{self, AppState},
    config::{database, seed::load_seed, server::ServerConfig},
    core::seed::seed_if_empty,
    errors::Result,
};
use dotenvy::dotenv;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Server settings
    let server_config = ServerConfig::load()
        .inspect_err(|e| error!("Failed to load server configuration: {}", e))?;
    let addr = server_config.socket_addr()?;

    // 4. Database connection and schema
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed an empty database if a seed file is present
    if Path::new(&server_config.seed_file).exists() {
        let seed = load_seed(&server_config.seed_file)?;
        if seed_if_empty(&db, &seed)
            .await
            .inspect_err(|e| error!("Failed to seed database: {}", e))?
        {
            info!("Seeded database from {}", server_config.seed_file);
        }
    } else {
        info!("No seed file at {}, skipping seed", server_config.seed_file);
    }

    // 6. Serve
    api::serve(AppState::new(db), addr).await
}
