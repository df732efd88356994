use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use shop_db::NewRegistration;
use shop_types::api::{CreateRegistrationRequest, UpdateStatusRequest};

use crate::admin::StatusQuery;
use crate::auth::AppState;
use crate::error::ApiError;
use crate::{mapper, with_db};

/// Public seller-onboarding request. Only the email is mandatory.
pub async fn submit_request(
    State(state): State<AppState>,
    Json(req): Json<CreateRegistrationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_string();
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email is required".into()));
    }

    let request = with_db(&state, move |db| {
        let id = Uuid::new_v4().to_string();
        db.create_registration_request(&NewRegistration {
            id: &id,
            email: &email,
            phone: req.phone.as_deref(),
            business_license_image: req.business_license_image.as_deref(),
            bank_statement_image: req.bank_statement_image.as_deref(),
            business_number: req.business_number.as_deref(),
            bank_name: req.bank_name.as_deref(),
            bank_account_number: req.bank_account_number.as_deref(),
            notes: req.notes.as_deref(),
        })?;
        info!("Registration request received from {}", email);

        db.get_registration_request(&id)?
            .map(mapper::registration_dto)
            .ok_or(ApiError::NotFound("Registration request"))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// Newest first; `?status=` narrows to one review state.
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let requests = with_db(&state, move |db| {
        Ok(db
            .list_registration_requests(query.status)?
            .into_iter()
            .map(mapper::registration_dto)
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(requests))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = with_db(&state, move |db| {
        let id = request_id.to_string();
        if !db.update_registration_status(&id, req.status)? {
            return Err(ApiError::NotFound("Registration request"));
        }
        info!("Registration request {} set to {}", id, req.status.as_str());

        db.get_registration_request(&id)?
            .map(mapper::registration_dto)
            .ok_or(ApiError::NotFound("Registration request"))
    })
    .await?;

    Ok(Json(request))
}
