//! Row → DTO conversions.
//!
//! Rows carry ids, timestamps and status strings exactly as SQLite stores
//! them. A corrupt value is logged and replaced with a default so one bad row
//! does not fail a whole listing.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use shop_db::models::{
    BusinessLicenseRow, BusinessProfileRow, CategoryRow, OrderItemRow, OrderRow, ProductImageRow,
    ProductRow, RegistrationRequestRow, UserRow,
};
use shop_types::api::{
    BusinessLicenseDto, BusinessProfileDto, CategoryNode, OrderDto, OrderItemDto, ProductDto,
    RegistrationRequestDto, UserDto, UserSummary,
};
use shop_types::models::ApprovalStatus;

pub fn parse_uuid(field: &str, value: &str) -> Uuid {
    value.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", field, value, e);
        Uuid::default()
    })
}

pub fn parse_timestamp(field: &str, value: &str) -> DateTime<Utc> {
    value
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt {} '{}': {}", field, value, e);
            DateTime::default()
        })
}

pub fn parse_or_default<T>(field: &str, value: &str) -> T
where
    T: FromStr + Default,
    T::Err: Display,
{
    value.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", field, value, e);
        T::default()
    })
}

// -- Users --

pub fn user_dto(user: UserRow, main_profile: Option<&BusinessProfileRow>) -> UserDto {
    UserDto {
        id: parse_uuid("user id", &user.id),
        role: parse_or_default("role", &user.role),
        created_at: parse_timestamp("user created_at", &user.created_at),
        username: user.username,
        name: user.name,
        phone: user.phone,
        email: user.email,
        business_number: user.business_number,
        is_active: user.is_active,
        company_name: main_profile.map(|p| p.business_name.clone()),
        office_address: main_profile.and_then(|p| p.office_address.clone()),
        storage_address: main_profile.and_then(|p| p.storage_address.clone()),
        business_status: main_profile
            .map(|p| parse_or_default::<ApprovalStatus>("profile status", &p.status)),
    }
}

pub fn user_summary(user: &UserRow) -> UserSummary {
    UserSummary {
        id: parse_uuid("user id", &user.id),
        username: user.username.clone(),
        name: user.name.clone(),
        phone: user.phone.clone(),
        email: user.email.clone(),
        role: parse_or_default("role", &user.role),
        business_number: user.business_number.clone(),
    }
}

pub fn profile_dto(profile: BusinessProfileRow) -> BusinessProfileDto {
    BusinessProfileDto {
        id: parse_uuid("profile id", &profile.id),
        user_id: parse_uuid("profile user_id", &profile.user_id),
        status: parse_or_default("profile status", &profile.status),
        approved_at: profile
            .approved_at
            .as_deref()
            .map(|v| parse_timestamp("profile approved_at", v)),
        approved_by: profile.approved_by.as_deref().map(|v| parse_uuid("approved_by", v)),
        created_at: parse_timestamp("profile created_at", &profile.created_at),
        business_name: profile.business_name,
        business_number: profile.business_number,
        representative_name: profile.representative_name,
        office_address: profile.office_address,
        storage_address: profile.storage_address,
        is_main: profile.is_main,
        rejection_reason: profile.rejection_reason,
    }
}

pub fn license_dto(license: BusinessLicenseRow) -> BusinessLicenseDto {
    BusinessLicenseDto {
        id: parse_uuid("license id", &license.id),
        user_id: parse_uuid("license user_id", &license.user_id),
        status: parse_or_default("license status", &license.status),
        created_at: parse_timestamp("license created_at", &license.created_at),
        file_url: license.file_url,
    }
}

pub fn registration_dto(req: RegistrationRequestRow) -> RegistrationRequestDto {
    RegistrationRequestDto {
        id: parse_uuid("registration id", &req.id),
        status: parse_or_default("registration status", &req.status),
        created_at: parse_timestamp("registration created_at", &req.created_at),
        email: req.email,
        phone: req.phone,
        business_license_image: req.business_license_image,
        bank_statement_image: req.bank_statement_image,
        business_number: req.business_number,
        bank_name: req.bank_name,
        bank_account_number: req.bank_account_number,
        notes: req.notes,
    }
}

// -- Categories --

pub fn category_node(row: CategoryRow) -> CategoryNode {
    CategoryNode {
        id: parse_uuid("category id", &row.id),
        parent_id: row.parent_id.as_deref().map(|p| parse_uuid("category parent_id", p)),
        name: row.name,
        code: row.code,
        depth: row.depth,
        display_order: row.display_order,
        children: vec![],
    }
}

/// Nest categories under their parents. Rows must arrive with siblings in
/// display order; orphans (unknown parent) are promoted to roots.
pub fn category_tree(rows: Vec<CategoryRow>) -> Vec<CategoryNode> {
    let mut children: HashMap<Option<String>, Vec<CategoryRow>> = HashMap::new();
    let known: std::collections::HashSet<String> = rows.iter().map(|r| r.id.clone()).collect();

    for row in rows {
        let parent = row.parent_id.clone().filter(|p| known.contains(p));
        children.entry(parent).or_default().push(row);
    }

    fn build(parent: Option<String>, children: &mut HashMap<Option<String>, Vec<CategoryRow>>) -> Vec<CategoryNode> {
        let rows = children.remove(&parent).unwrap_or_default();
        rows.into_iter()
            .map(|row| {
                let id = row.id.clone();
                let mut node = category_node(row);
                node.children = build(Some(id), children);
                node
            })
            .collect()
    }

    build(None, &mut children)
}

// -- Products --

pub fn product_dto(product: ProductRow, image_urls: Vec<String>) -> ProductDto {
    ProductDto {
        id: parse_uuid("product id", &product.id),
        category_id: parse_uuid("product category_id", &product.category_id),
        seller_id: parse_uuid("product seller_id", &product.seller_id),
        status: parse_or_default("product status", &product.status),
        created_at: parse_timestamp("product created_at", &product.created_at),
        total_amount: total_amount(&product),
        slug: product.slug,
        category_name: product.category_name,
        seller_name: product.seller_name,
        item_name: product.item_name,
        item_condition: product.item_condition,
        spec: product.spec,
        unit_price: product.unit_price,
        sale_unit: product.sale_unit,
        stock_quantity: product.stock_quantity,
        loading_address: product.loading_address,
        loading_address_display: product.loading_address_display,
        rejection_reason: product.rejection_reason,
        is_displayed: product.is_displayed,
        description: product.description,
        image_urls,
    }
}

fn total_amount(product: &ProductRow) -> i64 {
    product
        .unit_price
        .checked_mul(product.stock_quantity)
        .unwrap_or_else(|| {
            warn!(
                "Total amount overflows for product {} ({} x {})",
                product.id, product.unit_price, product.stock_quantity
            );
            0
        })
}

/// Attach images (already in display order) to their products.
pub fn product_dtos(products: Vec<ProductRow>, images: Vec<ProductImageRow>) -> Vec<ProductDto> {
    let mut by_product: HashMap<String, Vec<String>> = HashMap::new();
    for image in images {
        by_product.entry(image.product_id).or_default().push(image.image_url);
    }

    products
        .into_iter()
        .map(|p| {
            let urls = by_product.remove(&p.id).unwrap_or_default();
            product_dto(p, urls)
        })
        .collect()
}

// -- Orders --

pub fn order_item_dto(item: OrderItemRow) -> OrderItemDto {
    OrderItemDto {
        product_id: parse_uuid("order item product_id", &item.product_id),
        product_name_snapshot: item.product_name_snapshot,
        product_condition_snapshot: item.product_condition_snapshot,
        price_snapshot: item.price_snapshot,
        quantity: item.quantity,
        subtotal: item.subtotal,
    }
}

/// Assemble orders with their items and the buyer/seller summaries found in
/// `users`. A missing user leaves that side `None`.
pub fn order_dtos(orders: Vec<OrderRow>, items: Vec<OrderItemRow>, users: &[UserRow]) -> Vec<OrderDto> {
    let mut items_by_order: HashMap<String, Vec<OrderItemDto>> = HashMap::new();
    for item in items {
        items_by_order
            .entry(item.order_id.clone())
            .or_default()
            .push(order_item_dto(item));
    }
    let users: HashMap<&str, &UserRow> = users.iter().map(|u| (u.id.as_str(), u)).collect();

    orders
        .into_iter()
        .map(|order| OrderDto {
            id: parse_uuid("order id", &order.id),
            buyer: users.get(order.buyer_id.as_str()).map(|u| user_summary(u)),
            seller: users.get(order.seller_id.as_str()).map(|u| user_summary(u)),
            order_type: parse_or_default("order type", &order.order_type),
            status: parse_or_default("order status", &order.status),
            payment_status: parse_or_default("payment status", &order.payment_status),
            delivery_started_at: order
                .delivery_started_at
                .as_deref()
                .map(|v| parse_timestamp("delivery_started_at", v)),
            delivery_completed_at: order
                .delivery_completed_at
                .as_deref()
                .map(|v| parse_timestamp("delivery_completed_at", v)),
            created_at: parse_timestamp("order created_at", &order.created_at),
            items: items_by_order.remove(&order.id).unwrap_or_default(),
            order_number: order.order_number,
            truck_tonnage: order.truck_tonnage,
            truck_type: order.truck_type,
            shipping_loading_address: order.shipping_loading_address,
            shipping_unloading_address: order.shipping_unloading_address,
            recipient_name: order.recipient_name,
            recipient_phone: order.recipient_phone,
            total_amount: order.total_amount,
            order_memo: order.order_memo,
            admin_memo: order.admin_memo,
            carrier_info: order.carrier_info,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use shop_types::models::ProductStatus;

    fn category(id: &str, parent: Option<&str>, name: &str, depth: u32) -> CategoryRow {
        CategoryRow {
            id: id.to_string(),
            parent_id: parent.map(str::to_string),
            name: name.to_string(),
            code: None,
            depth,
            display_order: 0,
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_parse_sqlite_timestamp() {
        let ts = parse_timestamp("created_at", "2024-03-05 14:30:15");
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 3, 5));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (14, 30, 15));

        let rfc = parse_timestamp("created_at", "2024-03-05T14:30:15Z");
        assert_eq!(rfc, ts);

        assert_eq!(parse_timestamp("created_at", "yesterday"), DateTime::<Utc>::default());
    }

    #[test]
    fn test_corrupt_values_fall_back() {
        assert_eq!(parse_uuid("id", "not-a-uuid"), Uuid::default());
        assert_eq!(parse_or_default::<ProductStatus>("status", "archived"), ProductStatus::Pending);
    }

    #[test]
    fn test_category_tree_nests_children() {
        let a = Uuid::new_v4().to_string();
        let a1 = Uuid::new_v4().to_string();
        let a1x = Uuid::new_v4().to_string();
        let b = Uuid::new_v4().to_string();
        let rows = vec![
            category(&a, None, "Scaffolding", 0),
            category(&b, None, "Euroform", 0),
            category(&a1, Some(&a), "Pipe", 1),
            category(&a1x, Some(&a1), "Pipe 6m", 2),
        ];

        let tree = category_tree(rows);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].name, "Scaffolding");
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children[0].name, "Pipe 6m");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_product_images_attach_to_owner() {
        let product = |id: &str| ProductRow {
            id: id.to_string(),
            slug: format!("slug-{}", id),
            category_id: Uuid::new_v4().to_string(),
            category_name: "Pipe".into(),
            seller_id: Uuid::new_v4().to_string(),
            seller_name: "Daebak".into(),
            item_name: "pipe".into(),
            item_condition: "new".into(),
            spec: None,
            unit_price: 1500,
            sale_unit: "ea".into(),
            stock_quantity: 4,
            loading_address: None,
            loading_address_display: None,
            status: "selling".into(),
            rejection_reason: None,
            is_displayed: true,
            description: None,
            created_at: "2024-01-01 00:00:00".into(),
        };
        let image = |product_id: &str, url: &str| ProductImageRow {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            image_url: url.to_string(),
            display_order: 0,
        };

        let dtos = product_dtos(
            vec![product("p1"), product("p2")],
            vec![image("p2", "b1"), image("p1", "a1"), image("p2", "b2")],
        );
        assert_eq!(dtos[0].image_urls, vec!["a1"]);
        assert_eq!(dtos[1].image_urls, vec!["b1", "b2"]);
        assert_eq!(dtos[0].total_amount, 6000);
        assert_eq!(dtos[0].status, ProductStatus::Selling);

        let mut huge = product("p3");
        huge.unit_price = 10_000_000_000;
        huge.stock_quantity = 10_000_000_000;
        assert_eq!(product_dto(huge, vec![]).total_amount, 0);
    }
}
