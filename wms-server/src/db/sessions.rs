//! Table occupancy and customer sessions
//!
//! A table is occupied exactly when a live session exists for it. Claims
//! and releases keep both sides in step inside one transaction; mutual
//! exclusion between competing claims comes from the UNIQUE
//! `(restaurant_id, table_number)` constraint on `customer_sessions`.

use shared::error::{AppError, ErrorCode};
use shared::models::{AssistanceOutcome, ClaimOutcome, ClaimResponse, CustomerSession};
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoResult, begin_write, is_unique_violation};

const COLUMNS: &str = "id, restaurant_id, table_number, token, need_assistance, created_at";

/// What a claim should do given the table's current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimDecision {
    Create,
    Reconnect,
    Conflict(ErrorCode),
}

/// Decide a claim from the occupancy flag, the token holding the table (if
/// any) and the caller's token.
pub fn decide_claim(occupied: bool, holder: Option<&str>, caller: &str) -> ClaimDecision {
    match holder {
        Some(holder) if holder == caller => ClaimDecision::Reconnect,
        Some(_) => ClaimDecision::Conflict(ErrorCode::TableInUse),
        // flag set with nobody seated: refuse rather than silently repair
        None if occupied => ClaimDecision::Conflict(ErrorCode::TableOccupied),
        None => ClaimDecision::Create,
    }
}

/// Which session a release targets
#[derive(Debug, Clone, Copy)]
pub enum ReleaseTarget<'a> {
    Token(&'a str),
    Table { restaurant_id: i64, table_number: i64 },
}

fn table_not_found(restaurant_id: i64, table_number: i64) -> AppError {
    AppError::with_message(
        ErrorCode::TableNotFound,
        format!("Table {table_number} not found"),
    )
    .with_detail("restaurant_id", restaurant_id)
    .with_detail("table_number", table_number)
}

fn conflict(code: ErrorCode, table_number: i64) -> AppError {
    AppError::with_message(code, format!("Table {table_number} is already taken"))
        .with_detail("table_number", table_number)
}

async fn set_occupied(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    table_number: i64,
    occupied: bool,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE restaurant_tables SET is_occupied = ? WHERE restaurant_id = ? AND table_number = ?",
    )
    .bind(occupied)
    .bind(restaurant_id)
    .bind(table_number)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Claim `(restaurant_id, table_number)` for `caller`.
///
/// A caller without a token is issued a fresh one. Claiming again with the
/// token already seated at the table reconnects instead of failing.
pub async fn claim_table(
    pool: &SqlitePool,
    restaurant_id: i64,
    table_number: i64,
    caller: Option<&str>,
) -> RepoResult<ClaimResponse> {
    let token = caller
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut tx = begin_write(pool).await?;

    let occupied: Option<(bool,)> = sqlx::query_as(
        "SELECT is_occupied FROM restaurant_tables WHERE restaurant_id = ? AND table_number = ?",
    )
    .bind(restaurant_id)
    .bind(table_number)
    .fetch_optional(&mut *tx)
    .await?;
    let (occupied,) = occupied.ok_or_else(|| table_not_found(restaurant_id, table_number))?;

    let holder: Option<(String,)> = sqlx::query_as(
        "SELECT token FROM customer_sessions WHERE restaurant_id = ? AND table_number = ?",
    )
    .bind(restaurant_id)
    .bind(table_number)
    .fetch_optional(&mut *tx)
    .await?;

    let outcome = match decide_claim(occupied, holder.as_ref().map(|(t,)| t.as_str()), &token) {
        ClaimDecision::Conflict(code) => {
            tracing::info!(restaurant_id, table_number, code = %code, "Claim refused");
            return Err(conflict(code, table_number).into());
        }
        ClaimDecision::Reconnect => ClaimOutcome::Reconnected,
        ClaimDecision::Create => {
            let inserted = sqlx::query(
                "INSERT INTO customer_sessions (restaurant_id, table_number, token, created_at)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT (restaurant_id, table_number) DO NOTHING",
            )
            .bind(restaurant_id)
            .bind(table_number)
            .bind(&token)
            .bind(now_millis())
            .execute(&mut *tx)
            .await;
            match inserted {
                Ok(done) if done.rows_affected() == 0 => {
                    return Err(conflict(ErrorCode::TableInUse, table_number).into());
                }
                Ok(_) => ClaimOutcome::Created,
                Err(e) if is_unique_violation(&e) => {
                    return Err(AppError::new(ErrorCode::SessionAlreadyActive).into());
                }
                Err(e) => return Err(e.into()),
            }
        }
    };

    set_occupied(&mut tx, restaurant_id, table_number, true).await?;
    tx.commit().await?;

    tracing::info!(restaurant_id, table_number, outcome = ?outcome, "Table claimed");
    Ok(ClaimResponse {
        outcome,
        token,
        restaurant_id,
        table_number,
    })
}

/// End a session and free its table. Orders and order items go with it.
pub async fn release_table(pool: &SqlitePool, target: ReleaseTarget<'_>) -> RepoResult<CustomerSession> {
    let mut tx = begin_write(pool).await?;

    let session: Option<CustomerSession> = match target {
        ReleaseTarget::Token(token) => {
            let sql = format!("SELECT {COLUMNS} FROM customer_sessions WHERE token = ?");
            sqlx::query_as(&sql)
                .bind(token)
                .fetch_optional(&mut *tx)
                .await?
        }
        ReleaseTarget::Table {
            restaurant_id,
            table_number,
        } => {
            let sql = format!(
                "SELECT {COLUMNS} FROM customer_sessions WHERE restaurant_id = ? AND table_number = ?"
            );
            sqlx::query_as(&sql)
                .bind(restaurant_id)
                .bind(table_number)
                .fetch_optional(&mut *tx)
                .await?
        }
    };
    let session = session.ok_or_else(|| AppError::new(ErrorCode::SessionNotFound))?;

    set_occupied(&mut tx, session.restaurant_id, session.table_number, false).await?;
    sqlx::query("DELETE FROM customer_sessions WHERE id = ?")
        .bind(session.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(
        restaurant_id = session.restaurant_id,
        table_number = session.table_number,
        "Table released"
    );
    Ok(session)
}

pub async fn find_by_token(pool: &SqlitePool, token: &str) -> RepoResult<Option<CustomerSession>> {
    let sql = format!("SELECT {COLUMNS} FROM customer_sessions WHERE token = ?");
    let session = sqlx::query_as(&sql).bind(token).fetch_optional(pool).await?;
    Ok(session)
}

/// The live session holding `token`, or `SessionNotFound`
pub async fn get_by_token(pool: &SqlitePool, token: &str) -> RepoResult<CustomerSession> {
    find_by_token(pool, token)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound).into())
}

pub async fn find_by_table(
    pool: &SqlitePool,
    restaurant_id: i64,
    table_number: i64,
) -> RepoResult<Option<CustomerSession>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM customer_sessions WHERE restaurant_id = ? AND table_number = ?"
    );
    let session = sqlx::query_as(&sql)
        .bind(restaurant_id)
        .bind(table_number)
        .fetch_optional(pool)
        .await?;
    Ok(session)
}

pub async fn request_assistance(pool: &SqlitePool, session_id: i64) -> RepoResult<AssistanceOutcome> {
    let result = sqlx::query(
        "UPDATE customer_sessions SET need_assistance = 1 WHERE id = ? AND need_assistance = 0",
    )
    .bind(session_id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 1 {
        tracing::info!(session_id, "Assistance requested");
        Ok(AssistanceOutcome::Requested)
    } else {
        Ok(AssistanceOutcome::AlreadyRequested)
    }
}

/// Flip the assistance flag of the session at a table, returning the new value.
pub async fn toggle_assistance(pool: &SqlitePool, restaurant_id: i64, table_number: i64) -> RepoResult<bool> {
    let row: Option<(bool,)> = sqlx::query_as(
        "UPDATE customer_sessions SET need_assistance = 1 - need_assistance
         WHERE restaurant_id = ? AND table_number = ? RETURNING need_assistance",
    )
    .bind(restaurant_id)
    .bind(table_number)
    .fetch_optional(pool)
    .await?;
    let (need_assistance,) = row.ok_or_else(|| AppError::new(ErrorCode::SessionNotFound))?;
    Ok(need_assistance)
}

pub async fn clear_assistance(pool: &SqlitePool, restaurant_id: i64, table_number: i64) -> RepoResult<()> {
    let result = sqlx::query(
        "UPDATE customer_sessions SET need_assistance = 0
         WHERE restaurant_id = ? AND table_number = ? AND need_assistance = 1",
    )
    .bind(restaurant_id)
    .bind(table_number)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::with_message(
            ErrorCode::SessionNotFound,
            format!("Table {table_number} is not waiting for assistance"),
        )
        .into());
    }
    Ok(())
}

/// Table numbers waiting for assistance, ascending
pub async fn tables_needing_assistance(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        "SELECT table_number FROM customer_sessions
         WHERE restaurant_id = ? AND need_assistance = 1 ORDER BY table_number",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(n,)| n).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RepoError;
    use crate::db::test_support::{seed_restaurant, test_pool};

    fn code(err: RepoError) -> ErrorCode {
        AppError::from(err).code
    }

    async fn occupied(pool: &SqlitePool, restaurant_id: i64, table_number: i64) -> bool {
        let (flag,): (bool,) = sqlx::query_as(
            "SELECT is_occupied FROM restaurant_tables WHERE restaurant_id = ? AND table_number = ?",
        )
        .bind(restaurant_id)
        .bind(table_number)
        .fetch_one(pool)
        .await
        .unwrap();
        flag
    }

    async fn session_count(pool: &SqlitePool) -> i64 {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customer_sessions")
            .fetch_one(pool)
            .await
            .unwrap();
        n
    }

    /// occupied flag agrees with session presence on every table
    async fn assert_consistent(pool: &SqlitePool, restaurant_id: i64) {
        let rows: Vec<(i64, bool, i64)> = sqlx::query_as(
            "SELECT t.table_number, t.is_occupied, COUNT(s.id)
             FROM restaurant_tables t
             LEFT JOIN customer_sessions s
               ON s.restaurant_id = t.restaurant_id AND s.table_number = t.table_number
             WHERE t.restaurant_id = ? GROUP BY t.table_number, t.is_occupied",
        )
        .bind(restaurant_id)
        .fetch_all(pool)
        .await
        .unwrap();
        for (table, flag, sessions) in rows {
            assert_eq!(flag, sessions == 1, "table {table}");
        }
    }

    #[test]
    fn test_decide_claim() {
        assert_eq!(decide_claim(false, None, "a"), ClaimDecision::Create);
        assert_eq!(decide_claim(true, Some("a"), "a"), ClaimDecision::Reconnect);
        assert_eq!(
            decide_claim(true, Some("a"), "b"),
            ClaimDecision::Conflict(ErrorCode::TableInUse)
        );
        assert_eq!(
            decide_claim(true, None, "a"),
            ClaimDecision::Conflict(ErrorCode::TableOccupied)
        );
        // flag out of step but the session is ours
        assert_eq!(decide_claim(false, Some("a"), "a"), ClaimDecision::Reconnect);
    }

    #[tokio::test]
    async fn test_claim_same_token_reconnects() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 3).await;

        let first = claim_table(&pool, r, 2, Some("tok")).await.unwrap();
        let second = claim_table(&pool, r, 2, Some("tok")).await.unwrap();

        assert_eq!(first.outcome, ClaimOutcome::Created);
        assert_eq!(second.outcome, ClaimOutcome::Reconnected);
        assert_eq!(session_count(&pool).await, 1);
        assert!(occupied(&pool, r, 2).await);
        assert_consistent(&pool, r).await;
    }

    #[tokio::test]
    async fn test_claim_other_token_conflicts() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 3).await;

        claim_table(&pool, r, 1, Some("alice")).await.unwrap();
        let err = claim_table(&pool, r, 1, Some("bob")).await.unwrap_err();

        assert_eq!(code(err), ErrorCode::TableInUse);
        assert_eq!(session_count(&pool).await, 1);
        assert_consistent(&pool, r).await;
    }

    #[tokio::test]
    async fn test_claim_without_token_mints_one() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 1).await;

        let claimed = claim_table(&pool, r, 1, None).await.unwrap();
        assert_eq!(claimed.outcome, ClaimOutcome::Created);
        assert!(uuid::Uuid::parse_str(&claimed.token).is_ok());

        let again = claim_table(&pool, r, 1, Some(&claimed.token)).await.unwrap();
        assert_eq!(again.outcome, ClaimOutcome::Reconnected);
    }

    #[tokio::test]
    async fn test_claim_unknown_table() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 2).await;

        let err = claim_table(&pool, r, 9, Some("tok")).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::TableNotFound);

        let err = claim_table(&pool, r + 1, 1, Some("tok")).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::TableNotFound);
        assert_eq!(session_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_claim_stale_occupied_flag_conflicts() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 1).await;
        sqlx::query("UPDATE restaurant_tables SET is_occupied = 1 WHERE restaurant_id = ?")
            .bind(r)
            .execute(&pool)
            .await
            .unwrap();

        let err = claim_table(&pool, r, 1, Some("tok")).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::TableOccupied);
    }

    #[tokio::test]
    async fn test_one_token_one_table() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 2).await;

        claim_table(&pool, r, 1, Some("tok")).await.unwrap();
        let err = claim_table(&pool, r, 2, Some("tok")).await.unwrap_err();

        assert_eq!(code(err), ErrorCode::SessionAlreadyActive);
        assert!(!occupied(&pool, r, 2).await);
        assert_consistent(&pool, r).await;
    }

    #[tokio::test]
    async fn test_release_frees_table_with_orders() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 1).await;
        let claimed = claim_table(&pool, r, 1, Some("tok")).await.unwrap();
        let session = get_by_token(&pool, &claimed.token).await.unwrap();
        for _ in 0..3 {
            sqlx::query("INSERT INTO orders (session_id, order_time) VALUES (?, 0)")
                .bind(session.id)
                .execute(&pool)
                .await
                .unwrap();
        }

        let released = release_table(&pool, ReleaseTarget::Token("tok")).await.unwrap();
        assert_eq!(released.table_number, 1);
        assert!(!occupied(&pool, r, 1).await);

        let (orders,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orders, 0);
        assert_consistent(&pool, r).await;
    }

    #[tokio::test]
    async fn test_release_by_table() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 2).await;
        claim_table(&pool, r, 2, Some("tok")).await.unwrap();

        release_table(
            &pool,
            ReleaseTarget::Table {
                restaurant_id: r,
                table_number: 2,
            },
        )
        .await
        .unwrap();

        assert!(!occupied(&pool, r, 2).await);
        let reclaimed = claim_table(&pool, r, 2, Some("next")).await.unwrap();
        assert_eq!(reclaimed.outcome, ClaimOutcome::Created);
    }

    #[tokio::test]
    async fn test_release_without_claim() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 2).await;
        claim_table(&pool, r, 1, Some("seated")).await.unwrap();

        let err = release_table(&pool, ReleaseTarget::Token("ghost")).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::SessionNotFound);

        let err = release_table(
            &pool,
            ReleaseTarget::Table {
                restaurant_id: r,
                table_number: 2,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(code(err), ErrorCode::SessionNotFound);

        assert!(occupied(&pool, r, 1).await);
        assert!(!occupied(&pool, r, 2).await);
        assert_consistent(&pool, r).await;
    }

    #[tokio::test]
    async fn test_claim_release_sequence_stays_consistent() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 3).await;

        claim_table(&pool, r, 1, Some("a")).await.unwrap();
        assert_consistent(&pool, r).await;
        claim_table(&pool, r, 2, Some("b")).await.unwrap();
        let _ = claim_table(&pool, r, 2, Some("c")).await;
        assert_consistent(&pool, r).await;
        release_table(&pool, ReleaseTarget::Token("a")).await.unwrap();
        assert_consistent(&pool, r).await;
        claim_table(&pool, r, 1, Some("c")).await.unwrap();
        let _ = release_table(&pool, ReleaseTarget::Token("a")).await;
        assert_consistent(&pool, r).await;
        release_table(&pool, ReleaseTarget::Token("b")).await.unwrap();
        release_table(&pool, ReleaseTarget::Token("c")).await.unwrap();
        assert_consistent(&pool, r).await;
        assert_eq!(session_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_assistance_flow() {
        let pool = test_pool().await;
        let r = seed_restaurant(&pool, 3).await;
        claim_table(&pool, r, 3, Some("x")).await.unwrap();
        claim_table(&pool, r, 1, Some("y")).await.unwrap();
        let x = get_by_token(&pool, "x").await.unwrap();

        assert_eq!(
            request_assistance(&pool, x.id).await.unwrap(),
            AssistanceOutcome::Requested
        );
        assert_eq!(
            request_assistance(&pool, x.id).await.unwrap(),
            AssistanceOutcome::AlreadyRequested
        );
        assert!(toggle_assistance(&pool, r, 1).await.unwrap());
        assert_eq!(tables_needing_assistance(&pool, r).await.unwrap(), vec![1, 3]);

        clear_assistance(&pool, r, 3).await.unwrap();
        let err = clear_assistance(&pool, r, 3).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::SessionNotFound);

        assert!(!toggle_assistance(&pool, r, 1).await.unwrap());
        assert!(tables_needing_assistance(&pool, r).await.unwrap().is_empty());

        let err = toggle_assistance(&pool, r, 2).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::SessionNotFound);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("wms.db").display());
        let pool = crate::db::DbService::new(&url).await.unwrap().pool;
        let restaurant_id = seed_restaurant(&pool, 1).await;

        let claims: Vec<_> = (0..8)
            .map(|i| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    let token = format!("tok{i}");
                    claim_table(&pool, restaurant_id, 1, Some(&token)).await
                })
            })
            .collect();

        let mut created = 0;
        for handle in claims {
            match handle.await.unwrap() {
                Ok(claimed) => {
                    assert_eq!(claimed.outcome, ClaimOutcome::Created);
                    created += 1;
                }
                Err(err) => assert_eq!(code(err), ErrorCode::TableInUse),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(session_count(&pool).await, 1);
        assert_consistent(&pool, restaurant_id).await;

        let releases: Vec<_> = (0..4)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    release_table(
                        &pool,
                        ReleaseTarget::Table {
                            restaurant_id,
                            table_number: 1,
                        },
                    )
                    .await
                })
            })
            .collect();

        let mut released = 0;
        for handle in releases {
            match handle.await.unwrap() {
                Ok(_) => released += 1,
                Err(err) => assert_eq!(code(err), ErrorCode::SessionNotFound),
            }
        }
        assert_eq!(released, 1);
        assert_eq!(session_count(&pool).await, 0);
        assert!(!occupied(&pool, restaurant_id, 1).await);
    }
}
