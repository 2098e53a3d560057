use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{RestaurantDetails, RestaurantLookup};

use crate::auth::Principal;
use crate::db;
use crate::state::AppState;

use super::{ApiResult, customer_session};

#[derive(Deserialize)]
pub struct LookupQuery {
    pub name: String,
    pub location: String,
}

/// GET /api/restaurants/lookup?name=&location=
///
/// Public: a customer finds the restaurant before claiming a table.
pub async fn lookup(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<RestaurantLookup> {
    let restaurant = db::restaurants::find_by_name_location(
        &state.pool,
        query.name.trim(),
        query.location.trim(),
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;
    Ok(Json(RestaurantLookup {
        restaurant_id: restaurant.id,
    }))
}

/// GET /api/restaurant
pub async fn details(State(state): State<AppState>, principal: Principal) -> ApiResult<RestaurantDetails> {
    let (restaurant_id, table_number) = match &principal {
        Principal::Staff(staff) => (staff.restaurant_id, None),
        Principal::Customer(token) => {
            let session = customer_session(&state, token).await?;
            (session.restaurant_id, Some(session.table_number))
        }
    };
    let restaurant = db::restaurants::get(&state.pool, restaurant_id).await?;
    Ok(Json(RestaurantDetails {
        name: restaurant.name,
        location: restaurant.location,
        table_number,
    }))
}
