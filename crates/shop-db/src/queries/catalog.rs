use anyhow::Result;
use rusqlite::Row;
use shop_types::models::{ProductSort, ProductStatus};
use uuid::Uuid;

use super::OptionalExt;
use crate::Database;
use crate::models::{CategoryRow, ProductImageRow, ProductRow};

/// Products joined with category name and seller display name. The partial
/// unique index on main profiles keeps the LEFT JOIN to at most one row.
const PRODUCT_SELECT: &str = "
    SELECT p.id, p.slug, p.category_id, c.name, p.seller_id,
           COALESCE(bp.business_name, u.name),
           p.item_name, p.item_condition, p.spec, p.unit_price, p.sale_unit,
           p.stock_quantity, p.loading_address, p.loading_address_display,
           p.status, p.rejection_reason, p.is_displayed, p.description, p.created_at
    FROM products p
    JOIN categories c ON c.id = p.category_id
    JOIN users u ON u.id = p.seller_id
    LEFT JOIN business_profiles bp ON bp.user_id = p.seller_id AND bp.is_main = 1";

#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    /// Matches the category and every descendant of it.
    pub category_id: Option<String>,
    pub item_condition: Option<String>,
    /// Substring match on the item name.
    pub item_name: Option<String>,
    pub seller_id: Option<String>,
    pub displayed_only: bool,
    pub sort: ProductSort,
}

pub struct NewProduct<'a> {
    pub id: &'a str,
    pub slug: &'a str,
    pub category_id: &'a str,
    pub seller_id: &'a str,
    pub item_name: &'a str,
    pub item_condition: &'a str,
    pub spec: Option<&'a str>,
    pub unit_price: i64,
    pub sale_unit: &'a str,
    pub stock_quantity: i64,
    pub loading_address: Option<&'a str>,
    pub loading_address_display: Option<&'a str>,
    pub description: Option<&'a str>,
    pub status: ProductStatus,
    pub is_displayed: bool,
}

impl Database {
    // -- Categories --

    /// Insert a category with depth derived from its parent (root = 0).
    /// Returns `None` when the parent does not exist, otherwise the depth.
    pub fn create_category(
        &self,
        id: &str,
        parent_id: Option<&str>,
        name: &str,
        code: Option<&str>,
        display_order: i64,
    ) -> Result<Option<u32>> {
        self.with_conn(|conn| {
            let depth = match parent_id {
                Some(pid) => {
                    let parent_depth: Option<u32> = conn
                        .query_row("SELECT depth FROM categories WHERE id = ?1", [pid], |r| r.get(0))
                        .optional()?;
                    match parent_depth {
                        Some(d) => d + 1,
                        None => return Ok(None),
                    }
                }
                None => 0,
            };

            conn.execute(
                "INSERT INTO categories (id, parent_id, name, code, depth, display_order)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, parent_id, name, code, depth, display_order],
            )?;
            Ok(Some(depth))
        })
    }

    /// Every category, ordered for tree assembly (siblings by display order).
    pub fn list_categories(&self) -> Result<Vec<CategoryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, parent_id, name, code, depth, display_order, created_at
                 FROM categories
                 ORDER BY depth, display_order, name",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(CategoryRow {
                        id: row.get(0)?,
                        parent_id: row.get(1)?,
                        name: row.get(2)?,
                        code: row.get(3)?,
                        depth: row.get(4)?,
                        display_order: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn category_exists(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM categories WHERE id = ?1", [id], |r| r.get(0))?;
            Ok(count > 0)
        })
    }

    // -- Products --

    pub fn list_products(&self, filter: &ProductFilter) -> Result<Vec<ProductRow>> {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if filter.displayed_only {
            conditions.push("p.is_displayed = 1".to_string());
        }
        if let Some(category_id) = &filter.category_id {
            params.push(category_id.clone());
            conditions.push(format!(
                "p.category_id IN (
                    WITH RECURSIVE tree(id) AS (
                        SELECT ?{n}
                        UNION ALL
                        SELECT c.id FROM categories c JOIN tree ON c.parent_id = tree.id
                    )
                    SELECT id FROM tree
                )",
                n = params.len()
            ));
        }
        if let Some(condition) = &filter.item_condition {
            params.push(condition.clone());
            conditions.push(format!("p.item_condition = ?{}", params.len()));
        }
        if let Some(name) = &filter.item_name {
            params.push(name.clone());
            conditions.push(format!("instr(p.item_name, ?{}) > 0", params.len()));
        }
        if let Some(seller_id) = &filter.seller_id {
            params.push(seller_id.clone());
            conditions.push(format!("p.seller_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let order_by = match filter.sort {
            ProductSort::Newest => "p.created_at DESC, p.rowid DESC",
            ProductSort::PriceAsc => "p.unit_price ASC, p.rowid DESC",
            ProductSort::PriceDesc => "p.unit_price DESC, p.rowid DESC",
        };
        let sql = format!("{}{} ORDER BY {}", PRODUCT_SELECT, where_clause, order_by);

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params.iter()), map_product)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_product_by_id(&self, id: &str) -> Result<Option<ProductRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE p.id = ?1", PRODUCT_SELECT);
            conn.query_row(&sql, [id], map_product).optional()
        })
    }

    pub fn get_product_by_slug(&self, slug: &str) -> Result<Option<ProductRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE p.slug = ?1", PRODUCT_SELECT);
            conn.query_row(&sql, [slug], map_product).optional()
        })
    }

    /// Insert a product and its images; image order follows `image_urls`.
    pub fn create_product(&self, product: &NewProduct<'_>, image_urls: &[String]) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO products
                    (id, slug, category_id, seller_id, item_name, item_condition, spec,
                     unit_price, sale_unit, stock_quantity, loading_address,
                     loading_address_display, description, status, is_displayed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                rusqlite::params![
                    product.id,
                    product.slug,
                    product.category_id,
                    product.seller_id,
                    product.item_name,
                    product.item_condition,
                    product.spec,
                    product.unit_price,
                    product.sale_unit,
                    product.stock_quantity,
                    product.loading_address,
                    product.loading_address_display,
                    product.description,
                    product.status.as_str(),
                    product.is_displayed,
                ],
            )?;

            for (i, url) in image_urls.iter().enumerate() {
                tx.execute(
                    "INSERT INTO product_images (id, product_id, image_url, display_order)
                     VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![Uuid::new_v4().to_string(), product.id, url, (i + 1) as i64],
                )?;
            }

            tx.commit()?;
            Ok(())
        })
    }

    /// Set review outcome on a product. Returns false when it does not exist.
    pub fn review_product(
        &self,
        id: &str,
        status: ProductStatus,
        is_displayed: bool,
        rejection_reason: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE products SET status = ?2, is_displayed = ?3, rejection_reason = ?4
                 WHERE id = ?1",
                rusqlite::params![id, status.as_str(), is_displayed, rejection_reason],
            )?;
            Ok(changed > 0)
        })
    }

    /// Batch-fetch images for a set of products, in display order.
    pub fn get_images_for_products(&self, product_ids: &[String]) -> Result<Vec<ProductImageRow>> {
        if product_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT id, product_id, image_url, display_order FROM product_images
                 WHERE product_id IN ({})
                 ORDER BY display_order, rowid",
                super::placeholders(1, product_ids.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(product_ids), |row| {
                    Ok(ProductImageRow {
                        id: row.get(0)?,
                        product_id: row.get(1)?,
                        image_url: row.get(2)?,
                        display_order: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn map_product(row: &Row<'_>) -> rusqlite::Result<ProductRow> {
    Ok(ProductRow {
        id: row.get(0)?,
        slug: row.get(1)?,
        category_id: row.get(2)?,
        category_name: row.get(3)?,
        seller_id: row.get(4)?,
        seller_name: row.get(5)?,
        item_name: row.get(6)?,
        item_condition: row.get(7)?,
        spec: row.get(8)?,
        unit_price: row.get(9)?,
        sale_unit: row.get(10)?,
        stock_quantity: row.get(11)?,
        loading_address: row.get(12)?,
        loading_address_display: row.get(13)?,
        status: row.get(14)?,
        rejection_reason: row.get(15)?,
        is_displayed: row.get(16)?,
        description: row.get(17)?,
        created_at: row.get(18)?,
    })
}
