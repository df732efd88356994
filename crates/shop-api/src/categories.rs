use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;
use uuid::Uuid;

use shop_types::api::{CategoryNode, CreateCategoryRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::{mapper, with_db};

/// The whole category forest, children nested under their parents.
pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tree = with_db(&state, |db| Ok(mapper::category_tree(db.list_categories()?))).await?;
    Ok(Json(tree))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Category name is required".into()));
    }

    let id = Uuid::new_v4();
    let node = with_db(&state, move |db| {
        let parent_id = req.parent_id.map(|p| p.to_string());
        let display_order = req.display_order.unwrap_or(0);
        let depth = db
            .create_category(&id.to_string(), parent_id.as_deref(), &name, req.code.as_deref(), display_order)?
            .ok_or(ApiError::NotFound("Parent category"))?;

        info!("Created category {} at depth {}", name, depth);
        Ok(CategoryNode {
            id,
            parent_id: req.parent_id,
            name,
            code: req.code,
            depth,
            display_order,
            children: vec![],
        })
    })
    .await?;

    Ok((StatusCode::CREATED, Json(node)))
}
