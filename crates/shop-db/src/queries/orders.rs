use std::fmt;

use anyhow::Result;
use rusqlite::Row;
use shop_types::models::OrderType;
use uuid::Uuid;

use super::OptionalExt;
use crate::Database;
use crate::models::{OrderItemRow, OrderRow};

const ORDER_COLUMNS: &str = "id, order_number, buyer_id, seller_id, order_type, truck_tonnage,
    truck_type, shipping_loading_address, shipping_unloading_address, recipient_name,
    recipient_phone, total_amount, status, payment_status, order_memo, admin_memo,
    delivery_started_at, delivery_completed_at, carrier_info, created_at";

#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: String,
    pub quantity: i64,
}

pub struct NewOrder<'a> {
    pub id: &'a str,
    pub order_number: &'a str,
    pub buyer_id: &'a str,
    pub order_type: OrderType,
    pub truck_tonnage: Option<&'a str>,
    pub truck_type: Option<&'a str>,
    pub shipping_loading_address: Option<&'a str>,
    pub shipping_unloading_address: Option<&'a str>,
    pub recipient_name: Option<&'a str>,
    pub recipient_phone: Option<&'a str>,
    pub order_memo: Option<&'a str>,
    pub lines: &'a [NewOrderLine],
}

/// Reasons an order is refused before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRejection {
    Empty,
    InvalidQuantity(String),
    ProductNotFound(String),
    NotForSale(String),
    OwnProduct(String),
    MixedSellers,
    InsufficientStock { product_id: String, available: i64 },
    AmountTooLarge,
}

impl fmt::Display for OrderRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "order has no items"),
            Self::InvalidQuantity(id) => write!(f, "quantity for product {} must be at least 1", id),
            Self::ProductNotFound(id) => write!(f, "product {} not found", id),
            Self::NotForSale(id) => write!(f, "product {} is not for sale", id),
            Self::OwnProduct(id) => write!(f, "product {} is your own listing", id),
            Self::MixedSellers => write!(f, "all items must come from the same seller"),
            Self::InsufficientStock { product_id, available } => {
                write!(f, "product {} has only {} in stock", product_id, available)
            }
            Self::AmountTooLarge => write!(f, "order amount is too large"),
        }
    }
}

struct StockedProduct {
    seller_id: String,
    item_name: String,
    item_condition: String,
    unit_price: i64,
    stock_quantity: i64,
    is_displayed: bool,
}

impl Database {
    // -- Orders --

    /// Validate the lines, take stock, snapshot product fields and insert the
    /// order with its items, all in one transaction. Repeated product ids are
    /// merged into one line.
    pub fn create_order(&self, order: &NewOrder<'_>) -> Result<std::result::Result<(), OrderRejection>> {
        let mut lines: Vec<NewOrderLine> = Vec::new();
        for line in order.lines {
            if line.quantity < 1 {
                return Ok(Err(OrderRejection::InvalidQuantity(line.product_id.clone())));
            }
            match lines.iter_mut().find(|l| l.product_id == line.product_id) {
                Some(existing) => match existing.quantity.checked_add(line.quantity) {
                    Some(quantity) => existing.quantity = quantity,
                    None => return Ok(Err(OrderRejection::InvalidQuantity(line.product_id.clone()))),
                },
                None => lines.push(line.clone()),
            }
        }
        if lines.is_empty() {
            return Ok(Err(OrderRejection::Empty));
        }

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let mut seller_id: Option<String> = None;
            let mut items: Vec<(NewOrderLine, StockedProduct)> = Vec::with_capacity(lines.len());
            for line in lines {
                let product = tx
                    .query_row(
                        "SELECT seller_id, item_name, item_condition, unit_price, stock_quantity, is_displayed
                         FROM products WHERE id = ?1",
                        [&line.product_id],
                        |row| {
                            Ok(StockedProduct {
                                seller_id: row.get(0)?,
                                item_name: row.get(1)?,
                                item_condition: row.get(2)?,
                                unit_price: row.get(3)?,
                                stock_quantity: row.get(4)?,
                                is_displayed: row.get(5)?,
                            })
                        },
                    )
                    .optional()?;

                let Some(product) = product else {
                    return Ok(Err(OrderRejection::ProductNotFound(line.product_id)));
                };
                if !product.is_displayed {
                    return Ok(Err(OrderRejection::NotForSale(line.product_id)));
                }
                if product.seller_id == order.buyer_id {
                    return Ok(Err(OrderRejection::OwnProduct(line.product_id)));
                }
                match &seller_id {
                    Some(s) if *s != product.seller_id => return Ok(Err(OrderRejection::MixedSellers)),
                    Some(_) => {}
                    None => seller_id = Some(product.seller_id.clone()),
                }
                if product.stock_quantity < line.quantity {
                    return Ok(Err(OrderRejection::InsufficientStock {
                        product_id: line.product_id,
                        available: product.stock_quantity,
                    }));
                }
                items.push((line, product));
            }

            let Some(seller_id) = seller_id else {
                return Ok(Err(OrderRejection::Empty));
            };
            let mut subtotals: Vec<i64> = Vec::with_capacity(items.len());
            let mut total: i64 = 0;
            for (line, product) in &items {
                let Some(subtotal) = product.unit_price.checked_mul(line.quantity) else {
                    return Ok(Err(OrderRejection::AmountTooLarge));
                };
                let Some(sum) = total.checked_add(subtotal) else {
                    return Ok(Err(OrderRejection::AmountTooLarge));
                };
                subtotals.push(subtotal);
                total = sum;
            }

            tx.execute(
                &format!(
                    "INSERT INTO orders ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                        ?12, 'pending', 'unpaid', ?13, NULL, NULL, NULL, NULL, datetime('now'))",
                    ORDER_COLUMNS
                ),
                rusqlite::params![
                    order.id,
                    order.order_number,
                    order.buyer_id,
                    seller_id,
                    order.order_type.as_str(),
                    order.truck_tonnage,
                    order.truck_type,
                    order.shipping_loading_address,
                    order.shipping_unloading_address,
                    order.recipient_name,
                    order.recipient_phone,
                    total,
                    order.order_memo,
                ],
            )?;

            for ((line, product), subtotal) in items.iter().zip(subtotals) {
                tx.execute(
                    "UPDATE products SET
                        stock_quantity = stock_quantity - ?2,
                        status = CASE WHEN stock_quantity - ?2 = 0 THEN 'sold_out' ELSE status END
                     WHERE id = ?1",
                    rusqlite::params![line.product_id, line.quantity],
                )?;
                tx.execute(
                    "INSERT INTO order_items
                        (id, order_id, product_id, product_name_snapshot, product_condition_snapshot,
                         price_snapshot, quantity, subtotal)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    rusqlite::params![
                        Uuid::new_v4().to_string(),
                        order.id,
                        line.product_id,
                        product.item_name,
                        product.item_condition,
                        product.unit_price,
                        line.quantity,
                        subtotal,
                    ],
                )?;
            }

            tx.commit()?;
            Ok(Ok(()))
        })
    }

    pub fn get_order(&self, id: &str) -> Result<Option<OrderRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS);
            conn.query_row(&sql, [id], map_order).optional()
        })
    }

    pub fn list_orders_for_buyer(&self, buyer_id: &str) -> Result<Vec<OrderRow>> {
        self.list_orders_where("buyer_id = ?1", buyer_id)
    }

    pub fn list_orders_for_seller(&self, seller_id: &str) -> Result<Vec<OrderRow>> {
        self.list_orders_where("seller_id = ?1", seller_id)
    }

    fn list_orders_where(&self, condition: &str, value: &str) -> Result<Vec<OrderRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM orders WHERE {} ORDER BY created_at DESC, rowid DESC",
                ORDER_COLUMNS, condition
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([value], map_order)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Batch-fetch items for a set of orders.
    pub fn get_items_for_orders(&self, order_ids: &[String]) -> Result<Vec<OrderItemRow>> {
        if order_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT id, order_id, product_id, product_name_snapshot, product_condition_snapshot,
                        price_snapshot, quantity, subtotal
                 FROM order_items WHERE order_id IN ({}) ORDER BY rowid",
                super::placeholders(1, order_ids.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(order_ids), |row| {
                    Ok(OrderItemRow {
                        id: row.get(0)?,
                        order_id: row.get(1)?,
                        product_id: row.get(2)?,
                        product_name_snapshot: row.get(3)?,
                        product_condition_snapshot: row.get(4)?,
                        price_snapshot: row.get(5)?,
                        quantity: row.get(6)?,
                        subtotal: row.get(7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn map_order(row: &Row<'_>) -> rusqlite::Result<OrderRow> {
    Ok(OrderRow {
        id: row.get(0)?,
        order_number: row.get(1)?,
        buyer_id: row.get(2)?,
        seller_id: row.get(3)?,
        order_type: row.get(4)?,
        truck_tonnage: row.get(5)?,
        truck_type: row.get(6)?,
        shipping_loading_address: row.get(7)?,
        shipping_unloading_address: row.get(8)?,
        recipient_name: row.get(9)?,
        recipient_phone: row.get(10)?,
        total_amount: row.get(11)?,
        status: row.get(12)?,
        payment_status: row.get(13)?,
        order_memo: row.get(14)?,
        admin_memo: row.get(15)?,
        delivery_started_at: row.get(16)?,
        delivery_completed_at: row.get(17)?,
        carrier_info: row.get(18)?,
        created_at: row.get(19)?,
    })
}
