use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use shop_db::models::ProductRow;
use shop_db::{Database, NewProduct, ProductFilter};
use shop_types::api::{Claims, CreateProductRequest, ProductDto};
use shop_types::models::{ProductSort, ProductStatus, Role};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::optional_claims;
use crate::{mapper, with_db};

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category_id: Option<String>,
    pub item_condition: Option<String>,
    pub item_name: Option<String>,
    pub seller_id: Option<String>,
    #[serde(default)]
    pub sort: ProductSort,
}

impl ProductQuery {
    /// Blank parameters count as absent; ids must be valid UUIDs.
    fn into_filter(self) -> Result<ProductFilter, ApiError> {
        Ok(ProductFilter {
            category_id: parse_id_param("category_id", self.category_id)?,
            item_condition: non_blank(self.item_condition),
            item_name: non_blank(self.item_name),
            seller_id: parse_id_param("seller_id", self.seller_id)?,
            displayed_only: true,
            sort: self.sort,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_id_param(field: &str, value: Option<String>) -> Result<Option<String>, ApiError> {
    non_blank(value)
        .map(|v| {
            v.parse::<Uuid>()
                .map(|id| id.to_string())
                .map_err(|_| ApiError::BadRequest(format!("Invalid {}", field)))
        })
        .transpose()
}

/// Public listing: displayed products only.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.into_filter()?;

    let products = with_db(&state, move |db| {
        let rows = db.list_products(&filter)?;
        with_images(db, rows)
    })
    .await?;

    Ok(Json(products))
}

/// Look up by id when `key` is a UUID, otherwise by slug. Hidden products are
/// still returned here so sellers can preview pending listings, but the
/// rejection reason is only shown to the seller and admins.
pub async fn get_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = optional_claims(&headers, &state.jwt_secret);

    let mut product = with_db(&state, move |db| {
        let row = match key.parse::<Uuid>() {
            Ok(id) => db.get_product_by_id(&id.to_string())?,
            Err(_) => db.get_product_by_slug(&key)?,
        }
        .ok_or(ApiError::NotFound("Product"))?;

        with_images(db, vec![row])?
            .pop()
            .ok_or(ApiError::NotFound("Product"))
    })
    .await?;

    let privileged = caller.is_some_and(|c| c.role == Role::Admin || c.sub == product.seller_id);
    if !privileged {
        product.rejection_reason = None;
    }

    Ok(Json(product))
}

/// Every listing of the caller, whatever its review status.
pub async fn list_my_products(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = ProductFilter {
        seller_id: Some(claims.sub.to_string()),
        ..ProductFilter::default()
    };

    let products = with_db(&state, move |db| {
        let rows = db.list_products(&filter)?;
        with_images(db, rows)
    })
    .await?;

    Ok(Json(products))
}

/// New listings wait for admin review: pending and hidden.
pub async fn create_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item_name = req.item_name.trim().to_string();
    if item_name.is_empty() {
        return Err(ApiError::BadRequest("Item name is required".into()));
    }
    if req.item_condition.trim().is_empty() || req.sale_unit.trim().is_empty() {
        return Err(ApiError::BadRequest("Item condition and sale unit are required".into()));
    }
    if req.unit_price < 0 {
        return Err(ApiError::BadRequest("Unit price must not be negative".into()));
    }
    if req.stock_quantity < 0 {
        return Err(ApiError::BadRequest("Stock quantity must not be negative".into()));
    }
    if req.unit_price.checked_mul(req.stock_quantity).is_none() {
        return Err(ApiError::BadRequest("Unit price times stock quantity is too large".into()));
    }

    let product = with_db(&state, move |db| {
        let category_id = req.category_id.to_string();
        if !db.category_exists(&category_id)? {
            return Err(ApiError::NotFound("Category"));
        }

        let id = Uuid::new_v4().to_string();
        let slug = format!("{}-{}", slugify(&item_name), &id[..8]);
        let seller_id = claims.sub.to_string();

        db.create_product(
            &NewProduct {
                id: &id,
                slug: &slug,
                category_id: &category_id,
                seller_id: &seller_id,
                item_name: &item_name,
                item_condition: req.item_condition.trim(),
                spec: req.spec.as_deref(),
                unit_price: req.unit_price,
                sale_unit: req.sale_unit.trim(),
                stock_quantity: req.stock_quantity,
                loading_address: req.loading_address.as_deref(),
                loading_address_display: req.loading_address_display.as_deref(),
                description: req.description.as_deref(),
                status: ProductStatus::Pending,
                is_displayed: false,
            },
            &req.image_urls,
        )?;

        let row = db.get_product_by_id(&id)?.ok_or(ApiError::NotFound("Product"))?;
        info!("User {} listed product {} ({})", claims.username, row.item_name, row.slug);
        with_images(db, vec![row])?
            .pop()
            .ok_or(ApiError::NotFound("Product"))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

pub(crate) fn with_images(db: &Database, rows: Vec<ProductRow>) -> Result<Vec<ProductDto>, ApiError> {
    let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
    let images = db.get_images_for_products(&ids)?;
    Ok(mapper::product_dtos(rows, images))
}

/// Lowercase, keep letters and digits (any script), join runs of anything
/// else with a single '-'.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "product".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Steel Pipe 6m"), "steel-pipe-6m");
        assert_eq!(slugify("  유로폼 (신재)  "), "유로폼-신재");
        assert_eq!(slugify("***"), "product");
    }

    #[test]
    fn test_blank_query_params_are_ignored() {
        let filter = ProductQuery {
            category_id: Some("  ".into()),
            item_name: Some("".into()),
            ..ProductQuery::default()
        }
        .into_filter()
        .unwrap();
        assert!(filter.category_id.is_none());
        assert!(filter.item_name.is_none());
        assert!(filter.displayed_only);
    }

    #[test]
    fn test_invalid_category_id_rejected() {
        let result = ProductQuery {
            category_id: Some("pipes".into()),
            ..ProductQuery::default()
        }
        .into_filter();
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
