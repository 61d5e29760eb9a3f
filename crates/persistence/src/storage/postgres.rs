//! PostgreSQL storage backend.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::{ChangeSet, Changes, Commit, Storage};
use crate::entities::{AddressEntity, UserEntity};
use crate::error::PersistenceError;
use crate::metrics::{record_pool_metrics, QueryTimer};

/// Storage backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Creates a new PgStorage with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn write_addresses(
        tx: &mut Transaction<'_, Postgres>,
        changes: Changes<AddressEntity>,
    ) -> Result<(Vec<i32>, i64), sqlx::Error> {
        let mut affected = 0i64;
        let mut ids = Vec::with_capacity(changes.inserted.len());

        for address in &changes.inserted {
            let id = sqlx::query_scalar::<_, i32>(
                r#"
                INSERT INTO addresses (address_line1, address_line2, address_line3, post_code)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(&address.address_line1)
            .bind(&address.address_line2)
            .bind(&address.address_line3)
            .bind(&address.post_code)
            .fetch_one(&mut **tx)
            .await?;
            ids.push(id);
            affected += 1;
        }

        for address in &changes.updated {
            let result = sqlx::query(
                r#"
                UPDATE addresses
                SET address_line1 = $2, address_line2 = $3, address_line3 = $4, post_code = $5
                WHERE id = $1
                "#,
            )
            .bind(address.id)
            .bind(&address.address_line1)
            .bind(&address.address_line2)
            .bind(&address.address_line3)
            .bind(&address.post_code)
            .execute(&mut **tx)
            .await?;
            affected += result.rows_affected() as i64;
        }

        for id in &changes.deleted {
            let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
                .bind(id)
                .execute(&mut **tx)
                .await?;
            affected += result.rows_affected() as i64;
        }

        Ok((ids, affected))
    }

    async fn write_users(
        tx: &mut Transaction<'_, Postgres>,
        changes: Changes<UserEntity>,
    ) -> Result<(Vec<i32>, i64), sqlx::Error> {
        let mut affected = 0i64;
        let mut ids = Vec::with_capacity(changes.inserted.len());

        for user in &changes.inserted {
            let id = sqlx::query_scalar::<_, i32>(
                r#"
                INSERT INTO users (first_name, middle_name, last_name, email, address_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(&user.first_name)
            .bind(&user.middle_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(user.address_id)
            .fetch_one(&mut **tx)
            .await?;
            ids.push(id);
            affected += 1;
        }

        for user in &changes.updated {
            let result = sqlx::query(
                r#"
                UPDATE users
                SET first_name = $2, middle_name = $3, last_name = $4, email = $5, address_id = $6
                WHERE id = $1
                "#,
            )
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.middle_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(user.address_id)
            .execute(&mut **tx)
            .await?;
            affected += result.rows_affected() as i64;
        }

        for id in &changes.deleted {
            let result = sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&mut **tx)
                .await?;
            affected += result.rows_affected() as i64;
        }

        Ok((ids, affected))
    }
}

#[async_trait]
impl Storage for PgStorage {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn fetch_addresses(&self) -> Result<Vec<AddressEntity>, PersistenceError> {
        let timer = QueryTimer::new("fetch_addresses");
        let result = sqlx::query_as::<_, AddressEntity>(
            r#"
            SELECT id, address_line1, address_line2, address_line3, post_code
            FROM addresses
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result?)
    }

    async fn fetch_address(&self, id: i32) -> Result<Option<AddressEntity>, PersistenceError> {
        let timer = QueryTimer::new("fetch_address");
        let result = sqlx::query_as::<_, AddressEntity>(
            r#"
            SELECT id, address_line1, address_line2, address_line3, post_code
            FROM addresses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?)
    }

    async fn address_exists(&self, address: &AddressEntity) -> Result<bool, PersistenceError> {
        let timer = QueryTimer::new("address_exists");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM addresses
                WHERE address_line1 IS NOT DISTINCT FROM $1
                  AND address_line2 IS NOT DISTINCT FROM $2
                  AND address_line3 IS NOT DISTINCT FROM $3
                  AND post_code IS NOT DISTINCT FROM $4
            )
            "#,
        )
        .bind(&address.address_line1)
        .bind(&address.address_line2)
        .bind(&address.address_line3)
        .bind(&address.post_code)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result?)
    }

    async fn fetch_users(&self) -> Result<Vec<UserEntity>, PersistenceError> {
        let timer = QueryTimer::new("fetch_users");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, first_name, middle_name, last_name, email, address_id
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result?)
    }

    async fn fetch_user(&self, id: i32) -> Result<Option<UserEntity>, PersistenceError> {
        let timer = QueryTimer::new("fetch_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, first_name, middle_name, last_name, email, address_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?)
    }

    async fn commit(&self, changes: ChangeSet) -> Result<Commit, PersistenceError> {
        if changes.is_empty() {
            return Ok(Commit::default());
        }

        let timer = QueryTimer::new("commit");
        let mut tx = self.pool.begin().await?;

        let (address_ids, address_rows) = Self::write_addresses(&mut tx, changes.addresses).await?;
        let (user_ids, user_rows) = Self::write_users(&mut tx, changes.users).await?;

        tx.commit().await?;
        timer.record();

        Ok(Commit {
            affected: address_rows + user_rows,
            address_ids,
            user_ids,
        })
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        record_pool_metrics(&self.pool);
        Ok(())
    }

    async fn migrate(&self) -> Result<(), PersistenceError> {
        sqlx::migrate!("./src/migrations").run(&self.pool).await?;
        Ok(())
    }
}
