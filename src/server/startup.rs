use std::time::Duration;

use fred::prelude::{ClientLike, Config as RedisConfig, Pool};
use sea_orm::DatabaseConnection;

use crate::server::{
    config::Config,
    error::Error,
    scheduler::Scheduler,
    service::{registry::ServiceRegistry, role_mapper::RoleMapper},
    worker::{handler::WorkerJobHandler, Worker},
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const REDIS_POOL_SIZE: usize = 6;

/// Running components of the synchronizer
pub struct App {
    pub db: DatabaseConnection,
    pub registry: ServiceRegistry,
    pub worker: Worker,
    pub scheduler: Scheduler,
}

/// Connect to the database and run migrations
pub async fn connect_to_database(config: &Config) -> Result<DatabaseConnection, Error> {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Connect to Valkey/Redis for the job queue & shared rate-limit budgets
pub async fn connect_to_redis(config: &Config) -> Result<Pool, Error> {
    let redis_config = RedisConfig::from_url(&config.valkey_url)?;
    let pool = Pool::new(redis_config, None, None, None, REDIS_POOL_SIZE)?;

    pool.connect();
    pool.wait_for_connect().await?;

    Ok(pool)
}

/// HTTP client shared by every remote service client
pub fn build_http_client() -> Result<reqwest::Client, Error> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("bifrost-sync/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()?;

    Ok(client)
}

/// Connects to every backing store and wires up the worker & scheduler, without starting them
pub async fn build_app(config: &Config) -> Result<App, Error> {
    let db = connect_to_database(config).await?;
    let redis_pool = connect_to_redis(config).await?;
    let http = build_http_client()?;

    let mapper = RoleMapper::new(config.role_cache_ttl);
    let registry = ServiceRegistry::from_config(config, http, &redis_pool, mapper)?;

    let handler = WorkerJobHandler::new(db.clone(), registry.clone());
    let worker = Worker::new(config.workers, redis_pool, handler);

    let scheduler = Scheduler::new(db.clone(), registry.clone(), worker.queue.clone()).await?;

    Ok(App {
        db,
        registry,
        worker,
        scheduler,
    })
}
