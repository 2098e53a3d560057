use shared::error::{AppError, ErrorCode};
use shared::models::DiningTable;
use sqlx::SqlitePool;

use super::{RepoResult, begin_write, is_unique_violation};

/// Most tables one `add_count` call may create
pub const MAX_TABLES_PER_REQUEST: i64 = 200;

/// Append `count` tables numbered after the current highest one.
pub async fn add_count(pool: &SqlitePool, restaurant_id: i64, count: i64) -> RepoResult<Vec<i64>> {
    if !(1..=MAX_TABLES_PER_REQUEST).contains(&count) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Table count must be between 1 and {MAX_TABLES_PER_REQUEST}"),
        )
        .with_detail("count", count)
        .into());
    }

    let mut tx = begin_write(pool).await?;
    let (max,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(MAX(table_number), 0) FROM restaurant_tables WHERE restaurant_id = ?",
    )
    .bind(restaurant_id)
    .fetch_one(&mut *tx)
    .await?;

    let last = max.checked_add(count).ok_or_else(|| {
        AppError::with_message(ErrorCode::ValueOutOfRange, "Table numbers exhausted")
    })?;
    let numbers: Vec<i64> = (max + 1..=last).collect();
    for number in &numbers {
        sqlx::query("INSERT INTO restaurant_tables (restaurant_id, table_number) VALUES (?, ?)")
            .bind(restaurant_id)
            .bind(number)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!(restaurant_id, first = max + 1, count, "Tables added");
    Ok(numbers)
}

/// Add one table with a chosen number.
pub async fn add_number(pool: &SqlitePool, restaurant_id: i64, table_number: i64) -> RepoResult<()> {
    if table_number <= 0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "Table number must be positive",
        )
        .into());
    }
    let result = sqlx::query("INSERT INTO restaurant_tables (restaurant_id, table_number) VALUES (?, ?)")
        .bind(restaurant_id)
        .bind(table_number)
        .execute(pool)
        .await;
    match result {
        Ok(_) => {
            tracing::info!(restaurant_id, table_number, "Table added");
            Ok(())
        }
        Err(e) if is_unique_violation(&e) => Err(AppError::with_message(
            ErrorCode::TableAlreadyExists,
            format!("Table {table_number} already exists"),
        )
        .into()),
        Err(e) => Err(e.into()),
    }
}

pub async fn list(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as(
        "SELECT table_number, is_occupied FROM restaurant_tables
         WHERE restaurant_id = ? ORDER BY table_number",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(tables)
}

/// Remove a free table.
pub async fn delete(pool: &SqlitePool, restaurant_id: i64, table_number: i64) -> RepoResult<()> {
    let mut tx = begin_write(pool).await?;
    let row: Option<(bool,)> = sqlx::query_as(
        "SELECT is_occupied FROM restaurant_tables WHERE restaurant_id = ? AND table_number = ?",
    )
    .bind(restaurant_id)
    .bind(table_number)
    .fetch_optional(&mut *tx)
    .await?;

    match row {
        None => Err(AppError::with_message(
            ErrorCode::TableNotFound,
            format!("Table {table_number} not found"),
        )
        .into()),
        Some((true,)) => Err(AppError::with_message(
            ErrorCode::TableOccupied,
            format!("Table {table_number} is occupied"),
        )
        .into()),
        Some((false,)) => {
            sqlx::query("DELETE FROM restaurant_tables WHERE restaurant_id = ? AND table_number = ?")
                .bind(restaurant_id)
                .bind(table_number)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            tracing::info!(restaurant_id, table_number, "Table deleted");
            Ok(())
        }
    }
}
