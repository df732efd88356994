use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};
use uuid::Uuid;

use shop_db::{Database, NewProfile, NewUser};
use shop_types::api::{
    CheckPhoneRequest, CheckPhoneResponse, Claims, FindIdRequest, FindIdResponse, LoginRequest,
    LoginResponse, RegisterRequest, ResetPasswordRequest,
};
use shop_types::models::Role;

use crate::error::ApiError;
use crate::{mapper, with_db};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
}

const MIN_PASSWORD_LEN: usize = 8;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    let username_len = req.username.chars().count();
    if !(3..=32).contains(&username_len) {
        return Err(ApiError::BadRequest("Username must be 3 to 32 characters".into()));
    }
    validate_password(&req.password)?;
    if req.phone.trim().is_empty() {
        return Err(ApiError::BadRequest("Phone number is required".into()));
    }

    let user = with_db(&state, move |db| {
        if db.get_user_by_username(&req.username)?.is_some() {
            return Err(ApiError::Conflict("Username is already taken".into()));
        }

        let password_hash = hash_password(&req.password)?;
        let user_id = Uuid::new_v4().to_string();
        let name = req.name.as_deref().unwrap_or(&req.username);
        let new_user = NewUser {
            id: &user_id,
            username: &req.username,
            password_hash: &password_hash,
            name,
            phone: req.phone.trim(),
            email: req.email.as_deref(),
            role: Role::User,
            business_number: req.business_number.as_deref(),
        };

        // Supplying a company name opens a pending business profile
        let profile_id = Uuid::new_v4().to_string();
        let profile = req.company_name.as_deref().map(|company_name| NewProfile {
            id: &profile_id,
            user_id: &user_id,
            business_name: company_name,
            business_number: req.business_number.as_deref().unwrap_or_default(),
            representative_name: Some(name),
            office_address: req.office_address.as_deref(),
            storage_address: req.storage_address.as_deref(),
        });

        db.create_user_with_profile(&new_user, profile.as_ref())?;

        let row = db.get_user_by_id(&user_id)?.ok_or(ApiError::NotFound("User"))?;
        let main = db.get_main_profile(&user_id)?;
        Ok(mapper::user_dto(row, main.as_ref()))
    })
    .await?;

    info!("Registered user {}", user.username);
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = with_db(&state, move |db| {
        let user = db.get_user_by_username(&req.username)?.ok_or(ApiError::Unauthorized)?;
        if !user.is_active {
            warn!("Login attempt for inactive user {}", user.username);
            return Err(ApiError::Unauthorized);
        }
        verify_password(&req.password, &user.password_hash)?;
        Ok(user)
    })
    .await?;

    let user_id: Uuid = user.id.parse().map_err(|_| ApiError::Internal("corrupt user id".into()))?;
    let role = mapper::parse_or_default::<Role>("role", &user.role);

    let token = create_token(&state, user_id, &user.username, role)?;

    Ok(Json(LoginResponse {
        user_id,
        username: user.username,
        role,
        token,
    }))
}

pub async fn find_id(
    State(state): State<AppState>,
    Json(req): Json<FindIdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = with_db(&state, move |db| {
        db.find_user_by_name_and_phone(req.name.trim(), req.phone.trim())?
            .ok_or(ApiError::NotFound("Account"))
    })
    .await?;

    Ok(Json(FindIdResponse {
        username: mask_username(&user.username),
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_password(&req.new_password)?;

    with_db(&state, move |db| {
        // Unknown user and wrong phone look the same to the caller
        let user = db
            .get_user_by_username(&req.username)?
            .filter(|u| u.phone == req.phone.trim())
            .ok_or(ApiError::NotFound("Account"))?;

        let password_hash = hash_password(&req.new_password)?;
        db.update_password(&user.id, &password_hash)?;
        info!("Password reset for user {}", user.username);
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn check_phone(
    State(state): State<AppState>,
    Json(req): Json<CheckPhoneRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let phone = req.phone.trim().to_string();
    if phone.is_empty() {
        return Err(ApiError::BadRequest("Phone number is required".into()));
    }

    let in_use = with_db(&state, move |db| Ok(db.phone_in_use(&phone)?)).await?;

    Ok(Json(CheckPhoneResponse { available: !in_use }))
}

pub(crate) fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Hash with Argon2id into a PHC string.
pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, password_hash: &str) -> Result<(), ApiError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| ApiError::Internal(format!("corrupt password hash: {}", e)))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)
}

pub(crate) fn create_token(
    state: &AppStateInner,
    user_id: Uuid,
    username: &str,
    role: Role,
) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role,
        exp: (chrono::Utc::now() + state.token_ttl).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token encoding failed: {}", e)))
}

/// Keep the first three characters, mask the rest.
fn mask_username(username: &str) -> String {
    username
        .chars()
        .enumerate()
        .map(|(i, c)| if i < 3 { c } else { '*' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_username() {
        assert_eq!(mask_username("seller"), "sel***");
        assert_eq!(mask_username("abc"), "abc");
        assert_eq!(mask_username("김판매자"), "김판매*");
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("seller1234").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("seller1234", &hash).is_ok());
        assert!(matches!(verify_password("wrong-pass", &hash), Err(ApiError::Unauthorized)));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }
}
