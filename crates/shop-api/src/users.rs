use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, info};
use uuid::Uuid;

use shop_db::NewProfile;
use shop_types::api::{
    Claims, CreateBusinessProfileRequest, CreateLicenseRequest, UpdateUserRequest, UserDto,
};

use crate::auth::{self, AppState};
use crate::error::ApiError;
use crate::{mapper, with_db};

pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = with_db(&state, move |db| load_user(db, &claims.sub.to_string())).await?;
    Ok(Json(user))
}

/// Partial update of the account and its main business profile. Absent or
/// blank fields keep their stored value.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password = non_blank(req.password.as_deref());
    if let Some(password) = password {
        auth::validate_password(password)?;
    }
    let password = password.map(str::to_string);

    let user = with_db(&state, move |db| {
        let user_id = claims.sub.to_string();
        if db.get_user_by_id(&user_id)?.is_none() {
            return Err(ApiError::NotFound("User"));
        }

        if let Some(password) = password {
            let password_hash = auth::hash_password(&password)?;
            db.update_password(&user_id, &password_hash)?;
            info!("User {} changed password", claims.username);
        }

        db.update_user_contact(
            &user_id,
            non_blank(req.name.as_deref()),
            non_blank(req.phone.as_deref()),
            non_blank(req.email.as_deref()),
        )?;

        let company_name = non_blank(req.company_name.as_deref());
        let office_address = non_blank(req.office_address.as_deref());
        let storage_address = non_blank(req.storage_address.as_deref());
        if company_name.is_some() || office_address.is_some() || storage_address.is_some() {
            let updated = db.update_main_profile(&user_id, company_name, office_address, storage_address)?;
            if !updated {
                debug!("User {} has no main profile; business fields ignored", claims.username);
            }
        }

        load_user(db, &user_id)
    })
    .await?;

    Ok(Json(user))
}

pub async fn list_profiles(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let profiles = with_db(&state, move |db| {
        Ok(db
            .list_profiles_for_user(&claims.sub.to_string())?
            .into_iter()
            .map(mapper::profile_dto)
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(profiles))
}

/// Add a business profile awaiting review. The first one becomes main.
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateBusinessProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let business_name = req.business_name.trim().to_string();
    let business_number = req.business_number.trim().to_string();
    if business_name.is_empty() || business_number.is_empty() {
        return Err(ApiError::BadRequest("Business name and number are required".into()));
    }

    let profile = with_db(&state, move |db| {
        let id = Uuid::new_v4().to_string();
        let user_id = claims.sub.to_string();
        let is_main = db.create_profile(&NewProfile {
            id: &id,
            user_id: &user_id,
            business_name: &business_name,
            business_number: &business_number,
            representative_name: req.representative_name.as_deref(),
            office_address: req.office_address.as_deref(),
            storage_address: req.storage_address.as_deref(),
        })?;

        info!("User {} added business profile {} (main: {})", claims.username, business_name, is_main);
        let row = db.get_profile(&id)?.ok_or(ApiError::NotFound("Business profile"))?;
        Ok(mapper::profile_dto(row))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Switch the main profile. Returns the caller's profiles, main first.
pub async fn set_main_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profiles = with_db(&state, move |db| {
        let user_id = claims.sub.to_string();
        if !db.set_main_profile(&user_id, &profile_id.to_string())? {
            return Err(ApiError::NotFound("Business profile"));
        }
        Ok(db
            .list_profiles_for_user(&user_id)?
            .into_iter()
            .map(mapper::profile_dto)
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(profiles))
}

pub async fn list_licenses(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let licenses = with_db(&state, move |db| {
        Ok(db
            .list_licenses_for_user(&claims.sub.to_string())?
            .into_iter()
            .map(mapper::license_dto)
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(licenses))
}

pub async fn submit_license(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateLicenseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let file_url = req.file_url.trim().to_string();
    if file_url.is_empty() {
        return Err(ApiError::BadRequest("File URL is required".into()));
    }

    let license = with_db(&state, move |db| {
        let id = Uuid::new_v4().to_string();
        let user_id = claims.sub.to_string();
        db.create_license(&id, &user_id, &file_url)?;

        db.get_license(&id)?
            .map(mapper::license_dto)
            .ok_or(ApiError::NotFound("Business license"))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(license)))
}

fn load_user(db: &shop_db::Database, user_id: &str) -> Result<UserDto, ApiError> {
    let row = db.get_user_by_id(user_id)?.ok_or(ApiError::NotFound("User"))?;
    let main = db.get_main_profile(user_id)?;
    Ok(mapper::user_dto(row, main.as_ref()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
