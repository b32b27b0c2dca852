//! 公共 API 目录过滤

use crate::{
    error::AppError,
    middleware::CatalogState,
    models::catalog::{CatalogQuery, CatalogResponse},
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use std::sync::Arc;

/// `GET /api/publicapis?category=&limit=`
pub async fn list_public_apis(
    State(state): State<Arc<CatalogState>>,
    query: Result<Query<CatalogQuery>, QueryRejection>,
) -> Result<Json<CatalogResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::Validation(e.body_text()))?;

    let response = state.catalog_service.filter(&query)?;

    Ok(Json(response))
}
