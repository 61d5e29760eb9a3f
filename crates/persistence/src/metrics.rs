//! Storage metrics.
//!
//! Latency is labelled with the storage operation (`fetch_addresses`,
//! `address_exists`, `commit`, ...). Commit outcomes are counted per backend,
//! and the PostgreSQL pool gauges are refreshed on every health ping.

use std::time::Instant;

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;

/// Record how long one storage operation took.
pub fn record_query_duration(operation: &'static str, seconds: f64) {
    histogram!("storage_query_duration_seconds", "operation" => operation).record(seconds);
}

/// Count a commit. A negative `affected` is a commit the backend refused.
pub fn record_commit(backend: &'static str, affected: i64) {
    match u64::try_from(affected) {
        Ok(rows) => {
            counter!("storage_commits_total", "backend" => backend, "outcome" => "ok")
                .increment(1);
            counter!("storage_rows_affected_total", "backend" => backend).increment(rows);
        }
        Err(_) => {
            counter!("storage_commits_total", "backend" => backend, "outcome" => "failed")
                .increment(1);
        }
    }
}

/// Active and idle connection gauges for the PostgreSQL pool.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = u32::try_from(pool.num_idle()).unwrap_or(size);

    gauge!("storage_pool_connections", "state" => "active")
        .set(f64::from(size.saturating_sub(idle)));
    gauge!("storage_pool_connections", "state" => "idle").set(f64::from(idle));
}

/// Times one storage operation.
///
/// ```ignore
/// let timer = QueryTimer::new("fetch_user");
/// let row = sqlx::query_as::<_, UserEntity>(SELECT_USER).bind(id).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    operation: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_query_duration(self.operation, self.start.elapsed().as_secs_f64());
    }
}
