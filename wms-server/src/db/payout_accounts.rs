use shared::util::now_millis;
use sqlx::SqlitePool;

use super::RepoResult;

/// Stripe connected account id of a manager
pub async fn find(pool: &SqlitePool, staff_id: i64) -> RepoResult<Option<String>> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT stripe_account_id FROM payout_accounts WHERE staff_id = ?")
            .bind(staff_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(id,)| id))
}

/// Connected account of the restaurant's first manager
pub async fn find_for_restaurant(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT p.stripe_account_id FROM payout_accounts p
         JOIN staff s ON s.id = p.staff_id
         WHERE s.restaurant_id = ? AND s.role = 'manager'
         ORDER BY s.id LIMIT 1",
    )
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id,)| id))
}

/// Record `stripe_account_id` unless one is already stored; returns the stored id.
pub async fn insert_if_absent(pool: &SqlitePool, staff_id: i64, stripe_account_id: &str) -> RepoResult<String> {
    sqlx::query(
        "INSERT INTO payout_accounts (staff_id, stripe_account_id, created_at) VALUES (?, ?, ?)
         ON CONFLICT (staff_id) DO NOTHING",
    )
    .bind(staff_id)
    .bind(stripe_account_id)
    .bind(now_millis())
    .execute(pool)
    .await?;
    let (stored,): (String,) =
        sqlx::query_as("SELECT stripe_account_id FROM payout_accounts WHERE staff_id = ?")
            .bind(staff_id)
            .fetch_one(pool)
            .await?;
    Ok(stored)
}
