use sqlx::SqlitePool;

use super::RepoResult;

#[derive(sqlx::FromRow)]
pub struct PasswordReset {
    pub email: String,
    pub code_hash: String,
    pub attempts: i64,
    pub expires_at: i64,
    pub created_at: i64,
}

/// Store a fresh code for `email`, replacing any earlier one.
pub async fn upsert(
    pool: &SqlitePool,
    email: &str,
    code_hash: &str,
    expires_at: i64,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO password_resets (email, code_hash, attempts, expires_at, created_at)
         VALUES (?, ?, 0, ?, ?)
         ON CONFLICT (email) DO UPDATE SET
            code_hash = excluded.code_hash, attempts = 0,
            expires_at = excluded.expires_at, created_at = excluded.created_at",
    )
    .bind(email)
    .bind(code_hash)
    .bind(expires_at)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find(pool: &SqlitePool, email: &str) -> RepoResult<Option<PasswordReset>> {
    let record = sqlx::query_as(
        "SELECT email, code_hash, attempts, expires_at, created_at FROM password_resets WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

pub async fn increment_attempts(pool: &SqlitePool, email: &str) -> RepoResult<()> {
    sqlx::query("UPDATE password_resets SET attempts = attempts + 1 WHERE email = ?")
        .bind(email)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, email: &str) -> RepoResult<()> {
    sqlx::query("DELETE FROM password_resets WHERE email = ?")
        .bind(email)
        .execute(pool)
        .await?;
    Ok(())
}
