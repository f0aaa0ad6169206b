//! Connection pool utilities

use crate::config::JoblyConfig;
use crate::error::{JoblyError, JoblyResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from a [`JoblyConfig`].
///
/// Uses `NoTls`. Each request borrows one connection and returns it when the
/// statement resolves or fails.
///
/// ```ignore
/// let pool = jobly::create_pool(&JoblyConfig::from_env()?)?;
/// let client = pool.get().await?;
/// let jobs = Job::find_all(&client, &SearchCriteria::new()).await?;
/// ```
pub fn create_pool(config: &JoblyConfig) -> JoblyResult<Pool> {
    let pg_config: tokio_postgres::Config = config
        .database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| JoblyError::Connection(e.to_string()))?;

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(config.pool_max_size)
        .build()
        .map_err(|e| JoblyError::Pool(e.to_string()))
}
