//! Admin review of business profiles, licenses and product listings.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use shop_types::api::{Claims, RejectRequest, UpdateStatusRequest};
use shop_types::models::{ApprovalStatus, ProductStatus};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::products::with_images;
use crate::{mapper, with_db};

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<ApprovalStatus>,
}

/// Profiles in one review state, oldest first. Defaults to pending.
pub async fn list_business_profiles(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = query.status.unwrap_or_default();
    let profiles = with_db(&state, move |db| {
        Ok(db
            .list_profiles_by_status(status)?
            .into_iter()
            .map(mapper::profile_dto)
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(profiles))
}

pub async fn approve_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = with_db(&state, move |db| {
        let id = profile_id.to_string();
        if !db.approve_profile(&id, &claims.sub.to_string())? {
            return Err(ApiError::NotFound("Business profile"));
        }
        info!("Admin {} approved business profile {}", claims.username, id);
        let row = db.get_profile(&id)?.ok_or(ApiError::NotFound("Business profile"))?;
        Ok(mapper::profile_dto(row))
    })
    .await?;

    Ok(Json(profile))
}

/// The body (a reason) is optional.
pub async fn reject_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(profile_id): Path<Uuid>,
    body: Option<Json<RejectRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body.unwrap_or_default();

    let profile = with_db(&state, move |db| {
        let id = profile_id.to_string();
        if !db.reject_profile(&id, reason(&req))? {
            return Err(ApiError::NotFound("Business profile"));
        }
        info!("Admin {} rejected business profile {}", claims.username, id);
        let row = db.get_profile(&id)?.ok_or(ApiError::NotFound("Business profile"))?;
        Ok(mapper::profile_dto(row))
    })
    .await?;

    Ok(Json(profile))
}

pub async fn update_license_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(license_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    with_db(&state, move |db| {
        if !db.update_license_status(&license_id.to_string(), req.status)? {
            return Err(ApiError::NotFound("Business license"));
        }
        info!("Admin {} set license {} to {}", claims.username, license_id, req.status.as_str());
        Ok(())
    })
    .await?;

    Ok(Json(serde_json::json!({ "id": license_id, "status": req.status })))
}

/// Approved listings go on sale and become visible.
pub async fn approve_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    review_product(state, claims, product_id, ProductStatus::Selling, None).await
}

pub async fn reject_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<Uuid>,
    body: Option<Json<RejectRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body.unwrap_or_default();
    review_product(state, claims, product_id, ProductStatus::Rejected, req.reason).await
}

async fn review_product(
    state: AppState,
    claims: Claims,
    product_id: Uuid,
    status: ProductStatus,
    rejection_reason: Option<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = with_db(&state, move |db| {
        let id = product_id.to_string();
        let displayed = status == ProductStatus::Selling;
        let reason = rejection_reason.as_deref().map(str::trim).filter(|r| !r.is_empty());
        if !db.review_product(&id, status, displayed, reason)? {
            return Err(ApiError::NotFound("Product"));
        }
        info!("Admin {} set product {} to {}", claims.username, id, status.as_str());

        let row = db.get_product_by_id(&id)?.ok_or(ApiError::NotFound("Product"))?;
        with_images(db, vec![row])?
            .pop()
            .ok_or(ApiError::NotFound("Product"))
    })
    .await?;

    Ok(Json(product))
}

fn reason(req: &RejectRequest) -> Option<&str> {
    req.reason.as_deref().map(str::trim).filter(|r| !r.is_empty())
}
