use std::collections::BTreeSet;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use shop_db::models::OrderRow;
use shop_db::{Database, NewOrder, NewOrderLine, OrderRejection};
use shop_types::api::{Claims, CreateOrderRequest, OrderDto};
use shop_types::models::Role;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::{mapper, with_db};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    #[default]
    Buyer,
    Seller,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    /// `?as=seller` lists orders placed on the caller's products.
    #[serde(rename = "as", default)]
    pub side: OrderSide,
}

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<OrderQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();

    let orders = with_db(&state, move |db| {
        let rows = match query.side {
            OrderSide::Buyer => db.list_orders_for_buyer(&user_id)?,
            OrderSide::Seller => db.list_orders_for_seller(&user_id)?,
        };
        assemble(db, rows)
    })
    .await?;

    Ok(Json(orders))
}

/// Visible to the buyer, the seller and admins.
pub async fn get_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = with_db(&state, move |db| {
        let row = db
            .get_order(&order_id.to_string())?
            .ok_or(ApiError::NotFound("Order"))?;

        let caller = claims.sub.to_string();
        if claims.role != Role::Admin && row.buyer_id != caller && row.seller_id != caller {
            // Same answer as a missing order so ids can't be enumerated
            debug!("User {} denied order {}", claims.username, row.order_number);
            return Err(ApiError::NotFound("Order"));
        }

        assemble(db, vec![row])?.pop().ok_or(ApiError::NotFound("Order"))
    })
    .await?;

    Ok(Json(order))
}

pub async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let lines: Vec<NewOrderLine> = req
        .items
        .iter()
        .map(|item| NewOrderLine {
            product_id: item.product_id.to_string(),
            quantity: item.quantity,
        })
        .collect();

    let order = with_db(&state, move |db| {
        let id = Uuid::new_v4().to_string();
        let order_number = order_number(&id);
        let buyer_id = claims.sub.to_string();

        let new_order = NewOrder {
            id: &id,
            order_number: &order_number,
            buyer_id: &buyer_id,
            order_type: req.order_type,
            truck_tonnage: req.truck_tonnage.as_deref(),
            truck_type: req.truck_type.as_deref(),
            shipping_loading_address: req.shipping_loading_address.as_deref(),
            shipping_unloading_address: req.shipping_unloading_address.as_deref(),
            recipient_name: req.recipient_name.as_deref(),
            recipient_phone: req.recipient_phone.as_deref(),
            order_memo: req.order_memo.as_deref(),
            lines: &lines,
        };

        db.create_order(&new_order)?.map_err(|rejection| {
            debug!("Order by {} refused: {}", claims.username, rejection);
            match rejection {
                OrderRejection::ProductNotFound(_) => ApiError::NotFound("Product"),
                other => ApiError::BadRequest(capitalize(&other.to_string())),
            }
        })?;

        let row = db.get_order(&id)?.ok_or(ApiError::NotFound("Order"))?;
        info!("User {} placed order {} ({} won)", claims.username, row.order_number, row.total_amount);
        assemble(db, vec![row])?.pop().ok_or(ApiError::NotFound("Order"))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Batch-load items and both parties for a page of orders.
fn assemble(db: &Database, rows: Vec<OrderRow>) -> Result<Vec<OrderDto>, ApiError> {
    let order_ids: Vec<String> = rows.iter().map(|o| o.id.clone()).collect();
    let user_ids: Vec<String> = rows
        .iter()
        .flat_map(|o| [o.buyer_id.clone(), o.seller_id.clone()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let items = db.get_items_for_orders(&order_ids)?;
    let users = db.get_users_by_ids(&user_ids)?;
    Ok(mapper::order_dtos(rows, items, &users))
}

/// `ORD-YYYYMMDD-XXXXXXXX`, the suffix taken from the order id.
fn order_number(order_id: &str) -> String {
    let suffix: String = order_id
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .take(8)
        .collect::<String>()
        .to_uppercase();
    format!("ORD-{}-{}", chrono::Utc::now().format("%Y%m%d"), suffix)
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
