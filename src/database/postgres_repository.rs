use sqlx::PgPool;

/// The persistent store is the sole source of truth and the sole
/// serialization point across concurrent requests; no in-memory cache of
/// users or sessions exists anywhere.
#[derive(Clone)]
pub struct PostgresRepository {
    pub pool: PgPool,
}
