use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::{AppError, Pagination};
use crate::error::RegisterError;
use crate::models::{Category, NewCategory};
use crate::services::AppState;

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    new.validate()?;
    let category = state.categories.create(new).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Category>>, AppError> {
    let (skip, limit) = page.resolve(state.config.default_page_size);
    Ok(Json(state.categories.list(skip, limit).await?))
}

pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(state.categories.get(id).await?))
}

pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(category): Json<NewCategory>,
) -> Result<Json<Category>, AppError> {
    category.validate()?;
    Ok(Json(state.categories.update(id, category).await?))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    match state.categories.delete(id).await? {
        Some(_) => Ok(Json(json!({ "message": "Category deleted successfully" }))),
        None => Err(RegisterError::category_not_found(id).into()),
    }
}
