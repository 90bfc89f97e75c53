use axum::{
    Extension, Json, extract::State, extract::rejection::JsonRejection, http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use favor_db::models::NewRequest;
use favor_types::api::CreateServiceRequest;
use favor_types::models::ServiceRequest;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::notifications::request_created_message;
use crate::state::{AppState, with_db};
use crate::validate;

/// POST /requests. The request row and the notifications for every friend of
/// the caller are committed in one transaction.
pub async fn create_request(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<CreateServiceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let date_time = validate::date_time(&req.date_time)?;
    let price = validate::price(req.price)?;
    let message = request_created_message(&user.name);

    let owner = user.id;
    let (row, notified) = with_db(&state, move |db| {
        let new_request = NewRequest {
            description: &req.description,
            category: &req.category,
            location: &req.location,
            price,
            date_time: &date_time,
        };
        db.create_request_with_fanout(owner, &new_request, &message)
    })
    .await?;

    debug!("User {} created request {} ({} friends notified)", owner, row.id, notified);

    Ok((StatusCode::CREATED, Json(ServiceRequest::from(row))))
}

/// GET /requests. Only requests owned by users the caller has friended.
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<ServiceRequest>>, ApiError> {
    let rows = with_db(&state, move |db| db.list_friend_requests(user.id)).await?;
    Ok(Json(rows.into_iter().map(ServiceRequest::from).collect()))
}
