use axum::{
    Extension, Json,
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use favor_db::queries::AcceptOutcome;
use favor_types::api::CreateOfferRequest;
use favor_types::models::Offer;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::{AppState, with_db};
use crate::validate;

/// POST /offers. Any authenticated user may offer on any existing request.
pub async fn create_offer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<CreateOfferRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let price = validate::price(req.price)?;

    let request_id = req.request_id;
    // The only dangling reference an offer insert can hit is the request.
    let row = with_db(&state, move |db| db.create_offer(request_id, user.id, price))
        .await
        .map_err(|e| e.naming("Request"))?;

    debug!("Offer {} placed on request {}", row.id, request_id);

    Ok((StatusCode::CREATED, Json(Offer::from(row))))
}

/// GET /requests/{id}/offers. Not filtered by caller.
pub async fn list_offers(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Offer>>, ApiError> {
    let Path(request_id) = path?;
    let rows = with_db(&state, move |db| db.list_offers(request_id)).await?;
    Ok(Json(rows.into_iter().map(Offer::from).collect()))
}

/// POST /offers/{id}/accept. Only the owner of the targeted request may accept.
pub async fn accept_offer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Offer>, ApiError> {
    let Path(offer_id) = path?;
    let caller = user.id;

    match with_db(&state, move |db| db.accept_offer(offer_id, caller)).await? {
        AcceptOutcome::Accepted(row) => {
            debug!("User {} accepted offer {}", caller, offer_id);
            Ok(Json(Offer::from(row)))
        }
        AcceptOutcome::NotRequestOwner => Err(ApiError::Forbidden),
        AcceptOutcome::Missing => Err(ApiError::NotFound("Offer")),
    }
}
