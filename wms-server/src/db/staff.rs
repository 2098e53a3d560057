use shared::error::{AppError, ErrorCode};
use shared::models::{Restaurant, Staff, StaffRole};
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoResult, begin_write, is_unique_violation, restaurants};

/// Staff row including the password hash
#[derive(sqlx::FromRow)]
pub struct StaffRecord {
    pub id: i64,
    pub restaurant_id: i64,
    pub email: String,
    pub hashed_password: String,
    pub role: String,
    pub created_at: i64,
}

impl StaffRecord {
    pub fn role(&self) -> Option<StaffRole> {
        StaffRole::from_db(&self.role)
    }

    pub fn to_model(&self) -> Option<Staff> {
        Some(Staff {
            id: self.id,
            restaurant_id: self.restaurant_id,
            email: self.email.clone(),
            role: self.role()?,
            created_at: self.created_at,
        })
    }
}

fn email_taken(email: &str) -> AppError {
    AppError::with_message(
        ErrorCode::StaffEmailExists,
        format!("An account with email {email} already exists"),
    )
}

async fn insert(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    email: &str,
    hashed_password: &str,
    role: StaffRole,
) -> RepoResult<Staff> {
    let now = now_millis();
    let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
        "INSERT INTO staff (restaurant_id, email, hashed_password, role, created_at)
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(restaurant_id)
    .bind(email)
    .bind(hashed_password)
    .bind(role.as_db())
    .bind(now)
    .fetch_one(&mut *conn)
    .await;

    match result {
        Ok((id,)) => Ok(Staff {
            id,
            restaurant_id,
            email: email.to_string(),
            role,
            created_at: now,
        }),
        Err(e) if is_unique_violation(&e) => Err(email_taken(email).into()),
        Err(e) => Err(e.into()),
    }
}

/// Create a restaurant together with its first manager.
pub async fn register_manager(
    pool: &SqlitePool,
    email: &str,
    hashed_password: &str,
    name: &str,
    location: &str,
) -> RepoResult<(Restaurant, Staff)> {
    let mut tx = begin_write(pool).await?;
    let restaurant = restaurants::create(&mut tx, name, location).await?;
    let manager = insert(&mut tx, restaurant.id, email, hashed_password, StaffRole::Manager).await?;
    tx.commit().await?;

    tracing::info!(restaurant_id = restaurant.id, staff_id = manager.id, "Restaurant registered");
    Ok((restaurant, manager))
}

/// Add a staff member to an existing restaurant.
pub async fn create(
    pool: &SqlitePool,
    restaurant_id: i64,
    email: &str,
    hashed_password: &str,
    role: StaffRole,
) -> RepoResult<Staff> {
    let mut conn = pool.acquire().await?;
    let staff = insert(&mut conn, restaurant_id, email, hashed_password, role).await?;
    tracing::info!(restaurant_id, staff_id = staff.id, role = role.as_db(), "Staff created");
    Ok(staff)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<StaffRecord>> {
    let record = sqlx::query_as(
        "SELECT id, restaurant_id, email, hashed_password, role, created_at FROM staff WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

pub async fn find(pool: &SqlitePool, staff_id: i64) -> RepoResult<Option<StaffRecord>> {
    let record = sqlx::query_as(
        "SELECT id, restaurant_id, email, hashed_password, role, created_at FROM staff WHERE id = ?",
    )
    .bind(staff_id)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

/// Staff of a restaurant other than managers, oldest first
pub async fn list_non_managers(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Staff>> {
    let records: Vec<StaffRecord> = sqlx::query_as(
        "SELECT id, restaurant_id, email, hashed_password, role, created_at FROM staff
         WHERE restaurant_id = ? AND role <> 'manager' ORDER BY id",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(records.iter().filter_map(StaffRecord::to_model).collect())
}

/// The restaurant's first manager
pub async fn find_manager(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Option<StaffRecord>> {
    let record = sqlx::query_as(
        "SELECT id, restaurant_id, email, hashed_password, role, created_at FROM staff
         WHERE restaurant_id = ? AND role = 'manager' ORDER BY id LIMIT 1",
    )
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

pub async fn update_password(pool: &SqlitePool, email: &str, hashed_password: &str) -> RepoResult<()> {
    let result = sqlx::query("UPDATE staff SET hashed_password = ? WHERE email = ?")
        .bind(hashed_password)
        .bind(email)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::StaffNotFound).into());
    }
    Ok(())
}
