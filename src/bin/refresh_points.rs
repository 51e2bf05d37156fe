//! Maintenance command recomputing accrued points and parsed sale dates.
//!
//! Runs the same store procedures as the "Refresh Points" button, for use from
//! cron after a bulk data load.

use std::env;

use config::Config;
use dotenvy::dotenv;

use pushkind_loyalty::db::establish_connection_pool;
use pushkind_loyalty::models::config::ServerConfig;
use pushkind_loyalty::repository::errors::RepositoryResult;
use pushkind_loyalty::repository::{DieselRepository, PointsWriter};

fn refresh<R>(repo: &R) -> RepositoryResult<()>
where
    R: PointsWriter,
{
    let points = repo.refresh_accrual()?;
    log::info!("{points}");
    let dates = repo.refresh_parsed_dates()?;
    log::info!("{dates}");
    Ok(())
}

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(config::Environment::with_prefix("APP"))
        .build();

    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Error loading settings: {err}");
            std::process::exit(1);
        }
    };

    let server_config = match settings.try_deserialize::<ServerConfig>() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let repo = DieselRepository::new(pool);

    if let Err(err) = refresh(&repo) {
        log::error!("Failed to refresh points: {err}");
        std::process::exit(1);
    }
}
