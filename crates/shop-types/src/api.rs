use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    ApprovalStatus, OrderStatus, OrderType, PaymentStatus, ProductStatus, Role,
};

// -- JWT Claims --

/// Bearer token claims. `sub` is the user id; `role` is the single role
/// claim checked by the admin guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub business_number: Option<String>,
    pub company_name: Option<String>,
    pub office_address: Option<String>,
    pub storage_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindIdRequest {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FindIdResponse {
    /// Username with everything past the first three characters masked.
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetPasswordRequest {
    pub username: String,
    pub phone: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckPhoneRequest {
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckPhoneResponse {
    pub available: bool,
}

// -- Users --

/// Account view returned by `/users/me` and registration. The business
/// fields come from the user's main profile and are `None` without one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: Role,
    pub business_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub company_name: Option<String>,
    pub office_address: Option<String>,
    pub storage_address: Option<String>,
    pub business_status: Option<ApprovalStatus>,
}

/// Compact user view embedded in orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: Role,
    pub business_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub company_name: Option<String>,
    pub office_address: Option<String>,
    pub storage_address: Option<String>,
}

// -- Business profiles --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessProfileDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub business_number: String,
    pub representative_name: Option<String>,
    pub office_address: Option<String>,
    pub storage_address: Option<String>,
    pub status: ApprovalStatus,
    pub is_main: bool,
    pub rejection_reason: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBusinessProfileRequest {
    pub business_name: String,
    pub business_number: String,
    pub representative_name: Option<String>,
    pub office_address: Option<String>,
    pub storage_address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub status: ApprovalStatus,
}

// -- Business licenses --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessLicenseDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_url: String,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateLicenseRequest {
    pub file_url: String,
}

// -- Registration requests --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRegistrationRequest {
    pub email: String,
    pub phone: Option<String>,
    pub business_license_image: Option<String>,
    pub bank_statement_image: Option<String>,
    pub business_number: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequestDto {
    pub id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub business_license_image: Option<String>,
    pub bank_statement_image: Option<String>,
    pub business_number: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub notes: Option<String>,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

// -- Categories --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub code: Option<String>,
    pub depth: u32,
    pub display_order: i64,
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub code: Option<String>,
    pub parent_id: Option<Uuid>,
    pub display_order: Option<i64>,
}

// -- Products --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: Uuid,
    pub slug: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub seller_id: Uuid,
    /// Business name of the seller's main profile, or the seller's own name.
    pub seller_name: String,
    pub item_name: String,
    pub item_condition: String,
    pub spec: Option<String>,
    pub unit_price: i64,
    pub sale_unit: String,
    pub stock_quantity: i64,
    pub total_amount: i64,
    pub loading_address: Option<String>,
    pub loading_address_display: Option<String>,
    pub status: ProductStatus,
    pub rejection_reason: Option<String>,
    pub is_displayed: bool,
    pub description: Option<String>,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProductRequest {
    pub category_id: Uuid,
    pub item_name: String,
    pub item_condition: String,
    pub spec: Option<String>,
    pub unit_price: i64,
    pub sale_unit: String,
    pub stock_quantity: i64,
    pub loading_address: Option<String>,
    pub loading_address_display: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

// -- Orders --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDto {
    pub product_id: Uuid,
    pub product_name_snapshot: String,
    pub product_condition_snapshot: String,
    pub price_snapshot: i64,
    pub quantity: i64,
    pub subtotal: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDto {
    pub id: Uuid,
    pub order_number: String,
    pub buyer: Option<UserSummary>,
    pub seller: Option<UserSummary>,
    pub order_type: OrderType,
    pub truck_tonnage: Option<String>,
    pub truck_type: Option<String>,
    pub shipping_loading_address: Option<String>,
    pub shipping_unloading_address: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub order_memo: Option<String>,
    pub admin_memo: Option<String>,
    pub delivery_started_at: Option<DateTime<Utc>>,
    pub delivery_completed_at: Option<DateTime<Utc>>,
    pub carrier_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemDto>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
    #[serde(default)]
    pub order_type: OrderType,
    pub truck_tonnage: Option<String>,
    pub truck_type: Option<String>,
    pub shipping_loading_address: Option<String>,
    pub shipping_unloading_address: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
    pub order_memo: Option<String>,
}
