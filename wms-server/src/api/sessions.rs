use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use shared::error::AppError;
use shared::models::{ClaimOutcome, ClaimResponse, ClaimTable};

use crate::auth::Principal;
use crate::auth::extractor::OptionalSessionToken;
use crate::db;
use crate::db::sessions::ReleaseTarget;
use crate::state::AppState;

use super::{ApiResult, customer_session};

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub restaurant_id: i64,
    pub table_number: i64,
    pub need_assistance: bool,
}

#[derive(Debug, Serialize)]
pub struct Released {
    pub restaurant_id: i64,
    pub table_number: i64,
}

/// POST /api/session
///
/// 201 when a new session starts, 200 when the caller's token already
/// holds the table.
pub async fn claim(
    State(state): State<AppState>,
    OptionalSessionToken(token): OptionalSessionToken,
    Json(data): Json<ClaimTable>,
) -> Result<(StatusCode, Json<ClaimResponse>), AppError> {
    let claimed = db::sessions::claim_table(
        &state.pool,
        data.restaurant_id,
        data.table_number,
        token.as_ref().map(|t| t.as_str()),
    )
    .await?;
    let status = match claimed.outcome {
        ClaimOutcome::Created => StatusCode::CREATED,
        ClaimOutcome::Reconnected => StatusCode::OK,
    };
    Ok((status, Json(claimed)))
}

/// GET /api/session (customer)
pub async fn status(State(state): State<AppState>, principal: Principal) -> ApiResult<SessionStatus> {
    let token = principal.require_customer()?;
    let session = customer_session(&state, token).await?;
    Ok(Json(SessionStatus {
        restaurant_id: session.restaurant_id,
        table_number: session.table_number,
        need_assistance: session.need_assistance,
    }))
}

/// DELETE /api/session (customer leaves)
pub async fn release(State(state): State<AppState>, principal: Principal) -> ApiResult<Released> {
    let token = principal.require_customer()?;
    let session = db::sessions::release_table(&state.pool, ReleaseTarget::Token(token.as_str())).await?;
    Ok(Json(Released {
        restaurant_id: session.restaurant_id,
        table_number: session.table_number,
    }))
}

/// DELETE /api/sessions/{table} (staff ends a table's session)
pub async fn force_release(
    State(state): State<AppState>,
    principal: Principal,
    Path(table_number): Path<i64>,
) -> ApiResult<Released> {
    let staff = principal.require_staff()?;
    let session = db::sessions::release_table(
        &state.pool,
        ReleaseTarget::Table {
            restaurant_id: staff.restaurant_id,
            table_number,
        },
    )
    .await?;
    Ok(Json(Released {
        restaurant_id: session.restaurant_id,
        table_number: session.table_number,
    }))
}
