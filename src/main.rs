use dotenvy::dotenv;
use kiosko_smart::{
    backend::SeaOrmBackend,
    config::{self, catalog, database, users},
    errors::Result,
    session::SessionContext,
    terminal::{self, AppContext},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible), on stderr so it stays out of the screens
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; env vars can also be set externally
    if dotenv().is_err() {
        info!("No .env file loaded.");
    }

    // 3. Load the application configuration
    let app_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Open the database and make sure the tables exist
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;
    let backend = SeaOrmBackend::new(db);

    // 5. Seed the catalog and the initial operator
    catalog::seed_catalog(&backend, &app_config.productos)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
    match users::operator_from_env() {
        Some(seed) => {
            users::seed_operator(&backend, &seed).await?;
        }
        None => warn!("KIOSKO_ADMIN_USER not set, no operator seeded."),
    }

    // 6. Run the terminal
    let session = SessionContext::new();
    let _session_log = session.spawn_change_logger();
    let ctx = AppContext {
        backend,
        session,
        settings: app_config.register,
    };
    terminal::run_terminal(ctx).await
}
