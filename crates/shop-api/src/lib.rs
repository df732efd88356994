pub mod admin;
pub mod auth;
pub mod categories;
pub mod error;
pub mod mapper;
pub mod middleware;
pub mod orders;
pub mod products;
pub mod registrations;
pub mod seed;
pub mod users;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use tracing::error;

use shop_db::Database;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;

use crate::middleware::{require_admin, require_auth};

/// Build the full `/api` router. Callers add transport layers (CORS, tracing).
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/find-id", post(auth::find_id))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/check-phone", post(auth::check_phone))
        .route("/products", get(products::list_products))
        .route("/products/{key}", get(products::get_product))
        .route("/categories", get(categories::list_categories))
        .route("/registration-requests", post(registrations::submit_request));

    let protected_routes = Router::new()
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/orders/{order_id}", get(orders::get_order))
        .route("/users/me", get(users::get_me).put(users::update_me))
        .route(
            "/users/me/products",
            get(products::list_my_products).post(products::create_product),
        )
        .route("/users/me/profiles", get(users::list_profiles).post(users::create_profile))
        .route("/users/me/profiles/{profile_id}/main", put(users::set_main_profile))
        .route("/users/me/licenses", get(users::list_licenses).post(users::submit_license))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin_routes = Router::new()
        .route("/admin/categories", post(categories::create_category))
        .route("/admin/business-profiles", get(admin::list_business_profiles))
        .route("/admin/business-profiles/{profile_id}/approve", post(admin::approve_profile))
        .route("/admin/business-profiles/{profile_id}/reject", post(admin::reject_profile))
        .route("/admin/business-licenses/{license_id}/status", put(admin::update_license_status))
        .route("/admin/products/{product_id}/approve", post(admin::approve_product))
        .route("/admin/products/{product_id}/reject", post(admin::reject_product))
        .route("/admin/registration-requests", get(registrations::list_requests))
        .route(
            "/admin/registration-requests/{request_id}/status",
            put(registrations::update_status),
        )
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let api = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .with_state(state);

    Router::new().nest("/api", api).fallback(handler_404)
}

async fn handler_404() -> ApiError {
    ApiError::NotFound("Route")
}

/// Run blocking DB work (and password hashing) off the async runtime.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal("worker task failed".to_string())
        })?
}
