//! SQLite row types. Ids and timestamps stay as stored text; the API layer
//! parses them.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: String,
    pub business_number: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct BusinessProfileRow {
    pub id: String,
    pub user_id: String,
    pub business_name: String,
    pub business_number: String,
    pub representative_name: Option<String>,
    pub office_address: Option<String>,
    pub storage_address: Option<String>,
    pub status: String,
    pub is_main: bool,
    pub rejection_reason: Option<String>,
    pub approved_at: Option<String>,
    pub approved_by: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub code: Option<String>,
    pub depth: u32,
    pub display_order: i64,
    pub created_at: String,
}

/// Product joined with its category name and the seller's display name
/// (main business name, falling back to the seller's own name).
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub slug: String,
    pub category_id: String,
    pub category_name: String,
    pub seller_id: String,
    pub seller_name: String,
    pub item_name: String,
    pub item_condition: String,
    pub spec: Option<String>,
    pub unit_price: i64,
    pub sale_unit: String,
    pub stock_quantity: i64,
    pub loading_address: Option<String>,
    pub loading_address_display: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub is_displayed: bool,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct ProductImageRow {
    pub id: String,
    pub product_id: String,
    pub image_url: String,
    pub display_order: i64,
}

#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: String,
    pub order_number: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub order_type: String,
    pub truck_tonnage: Option<String>,
    pub truck_type: Option<String>,
    pub shipping_loading_address: Option<String>,
    pub shipping_unloading_address: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
    pub total_amount: i64,
    pub status: String,
    pub payment_status: String,
    pub order_memo: Option<String>,
    pub admin_memo: Option<String>,
    pub delivery_started_at: Option<String>,
    pub delivery_completed_at: Option<String>,
    pub carrier_info: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct OrderItemRow {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub product_name_snapshot: String,
    pub product_condition_snapshot: String,
    pub price_snapshot: i64,
    pub quantity: i64,
    pub subtotal: i64,
}

#[derive(Debug, Clone)]
pub struct RegistrationRequestRow {
    pub id: String,
    pub email: String,
    pub phone: Option<String>,
    pub business_license_image: Option<String>,
    pub bank_statement_image: Option<String>,
    pub business_number: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct BusinessLicenseRow {
    pub id: String,
    pub user_id: String,
    pub file_url: String,
    pub status: String,
    pub created_at: String,
}
