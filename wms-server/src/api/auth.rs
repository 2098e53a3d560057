//! Authentication endpoints: register, login, logout, forgot-password,
//! reset-password

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{Restaurant, Staff, StaffRole};

use crate::auth::{Principal, jwt};
use crate::db;
use crate::email;
use crate::state::AppState;
use crate::util::{generate_code, hash_password, verify_password};

use super::ApiResult;

const MIN_PASSWORD_LEN: usize = 8;
const RESET_CODE_TTL_MS: i64 = 5 * 60 * 1000;
const MAX_RESET_ATTEMPTS: i64 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantSummary {
    pub id: i64,
    pub name: String,
    pub location: String,
}

impl From<Restaurant> for RestaurantSummary {
    fn from(r: Restaurant) -> Self {
        Self {
            id: r.id,
            name: r.name,
            location: r.location,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub role: StaffRole,
    pub restaurant: RestaurantSummary,
}

pub(crate) fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("A valid email address is required"));
    }
    Ok(email)
}

pub(crate) fn check_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooShort,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

pub(crate) fn hash(password: &str) -> Result<String, AppError> {
    hash_password(password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })
}

fn issue_token(staff: &Staff, secret: &str) -> Result<String, AppError> {
    jwt::create_token(staff, secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })
}

/// POST /api/auth/register
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub location: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = normalize_email(&req.email)?;
    check_password(&req.password)?;
    let name = req.name.trim();
    let location = req.location.trim();
    if name.is_empty() || location.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Restaurant name and location are required",
        ));
    }

    let hashed = hash(&req.password)?;
    let (restaurant, manager) =
        db::staff::register_manager(&state.pool, &email, &hashed, name, location).await?;
    let token = issue_token(&manager, &state.jwt_secret)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            role: manager.role,
            restaurant: restaurant.into(),
        }),
    ))
}

/// POST /api/auth/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let email = req.email.trim().to_lowercase();
    let record = db::staff::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&req.password, &record.hashed_password) {
        tracing::info!(staff_id = record.id, "Login failed: wrong password");
        return Err(AppError::invalid_credentials());
    }

    let staff = record.to_model().ok_or_else(|| {
        tracing::error!(staff_id = record.id, role = %record.role, "Staff row has unknown role");
        AppError::new(ErrorCode::InternalError)
    })?;
    let restaurant = db::restaurants::get(&state.pool, staff.restaurant_id).await?;
    let token = issue_token(&staff, &state.jwt_secret)?;

    tracing::info!(staff_id = staff.id, restaurant_id = staff.restaurant_id, "Staff logged in");
    Ok(Json(AuthResponse {
        token,
        role: staff.role,
        restaurant: restaurant.into(),
    }))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the client discards its copy.
pub async fn logout(principal: Principal) -> ApiResult<ApiResponse<()>> {
    let staff = principal.require_staff()?;
    tracing::info!(staff_id = staff.staff_id, "Staff logged out");
    Ok(Json(ApiResponse::ok_with_message("Logged out")))
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<ApiResponse<()>> {
    let email = req.email.trim().to_lowercase();
    let reply = || Json(ApiResponse::ok_with_message("If the email exists, a reset code has been sent"));

    // Same reply whether or not the account exists
    match db::staff::find_by_email(&state.pool, &email).await {
        Ok(Some(_)) => {}
        _ => return Ok(reply()),
    }

    let code = generate_code();
    let code_hash = hash(&code)?;
    let now = shared::util::now_millis();
    db::password_resets::upsert(&state.pool, &email, &code_hash, now + RESET_CODE_TTL_MS, now).await?;

    if let Err(e) = email::send_password_reset_code(state.mailer.as_ref(), &email, &code).await {
        tracing::error!(error = %e, "Failed to send password reset code");
    }

    Ok(reply())
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<ApiResponse<()>> {
    let email = req.email.trim().to_lowercase();
    check_password(&req.new_password)?;

    let record = db::password_resets::find(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::VerificationCodeInvalid))?;

    if shared::util::now_millis() > record.expires_at {
        return Err(AppError::new(ErrorCode::VerificationCodeExpired));
    }
    if record.attempts >= MAX_RESET_ATTEMPTS {
        return Err(AppError::new(ErrorCode::TooManyAttempts));
    }

    db::password_resets::increment_attempts(&state.pool, &email).await?;

    if !verify_password(&req.code, &record.code_hash) {
        return Err(AppError::new(ErrorCode::VerificationCodeInvalid));
    }

    let hashed = hash(&req.new_password)?;
    db::staff::update_password(&state.pool, &email, &hashed).await?;
    db::password_resets::delete(&state.pool, &email).await?;

    tracing::info!("Password reset completed");
    Ok(Json(ApiResponse::ok_with_message("Password has been reset")))
}
